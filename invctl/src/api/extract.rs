//! Request extractors whose rejections use the API error envelope.
//!
//! axum's stock `Json` and `Path` extractors answer malformed input with a plain-text
//! body. These wrappers route the rejection through [`Error`] instead, so every
//! failure a client sees is `{ "error": ... }`.

use crate::errors::Error;
use axum::extract::{FromRequest, FromRequestParts};

/// JSON body extractor; unknown fields, missing fields and type errors become 400s.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct AppJson<T>(pub T);

/// Path parameter extractor; an id that does not parse becomes a 400.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct AppPath<T>(pub T);
