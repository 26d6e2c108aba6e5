//! Normalisation applied to raw form input before validation.
//!
//! Free text is HTML-escaped here, once, and stored escaped. Renderers emit
//! it verbatim and escape everything else on output with [`escape_html`].

/// Trim and lowercase.
pub fn email(raw: &str) -> String { raw.trim().to_lowercase() }

pub fn password(raw: &str) -> String { raw.trim().to_owned() }

/// Trim and HTML-escape.
pub fn text(raw: &str) -> String { escape_html(raw.trim()) }

pub fn date(raw: &str) -> String { raw.trim().to_owned() }

/// Trim and lowercase a checkbox or boolean value.
pub fn flag(raw: &str) -> String { raw.trim().to_lowercase() }

/// Escape the five characters significant in HTML text and attributes.
pub fn escape_html(s: &str) -> String { quick_xml::escape::escape(s).into_owned() }
