//! Route handlers.
//!
//! Each handler turns a routed request into a [`Response`]. Failures never
//! leave this module: anything a handler cannot serve becomes `404 Not Found`.

pub mod files;

use crate::http::encoding::Negotiation;
use crate::http::request::Request;
use crate::http::response::{Response, TEXT_PLAIN};
use crate::routing::Handler;

pub use files::{DirectoryStore, FileError, FileStore};

/// Run `handler` for `req`.
pub fn handle(handler: &Handler, req: &Request, store: &dyn FileStore) -> Response {
    match handler {
        Handler::Root => Response::ok(),
        Handler::Echo { text } => echo(req, text),
        Handler::UserAgent => user_agent(req),
        Handler::FileRead { name } => files::read_file(store, name).unwrap_or_else(|e| {
            tracing::debug!(file = %name, error = %e, "File read failed");
            Response::not_found()
        }),
        Handler::FileWrite { name } => {
            files::write_file(store, name, req.body()).unwrap_or_else(|e| {
                tracing::warn!(file = %name, error = %e, "File write failed");
                Response::not_found()
            })
        }
        Handler::NotFound => Response::not_found(),
    }
}

fn echo(req: &Request, text: &str) -> Response {
    let coding = Negotiation::from_request(req).selected();
    let plain = Response::ok().with_body(text, TEXT_PLAIN);

    match plain.clone().encoded(coding) {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(error = %e, "Compression failed, sending identity body");
            plain
        }
    }
}

fn user_agent(req: &Request) -> Response {
    match req.user_agent() {
        Some(agent) => Response::ok().with_body(agent, TEXT_PLAIN),
        None => Response::not_found(),
    }
}
