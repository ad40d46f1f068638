//! Client-side form handling, without a browser.
//!
//! `FormModel` carries the advisory checks that run on blur, change and submit;
//! `FormClient` sends a validated form and turns the response envelope into a
//! banner. The server never relies on any of this.

pub mod constraints;
pub mod form;
pub mod submit;

pub use form::{FieldState, FormModel, SubmitCheck};
pub use submit::{Banner, BannerKind, FormClient, SubmitOutcome};
