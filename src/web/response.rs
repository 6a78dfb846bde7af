//! Responses produced by the gateway itself.

use crate::error::Denial;

const ERROR_PAGE_HEAD: &str = r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 4.01 Transitional//EN" "http://www.w3.org/TR/html4/loose.dtd">
<html lang="en">
    <head>
        <title>Galaxy</title>
        <style type="text/css">
        body {
            min-width: 500px;
            text-align: center;
        }
        .errormessage {
            font: 75% verdana, "Bitstream Vera Sans", geneva, arial, helvetica, helve, sans-serif;
            padding: 10px;
            margin: 100px auto;
            min-height: 32px;
            max-width: 500px;
            border: 1px solid #AA6666;
            background-color: #FFCCCC;
            text-align: left;
        }
        </style>
    </head>
    <body>
        <div class="errormessage">
"#;

const ERROR_PAGE_TAIL: &str = r#"        </div>
    </body>
</html>
"#;

/// Renders the two-field error page.
///
/// `title` and `message` are inserted verbatim; they come from fixed
/// denial texts, never from request data.
pub fn render_error_page(title: &str, message: &str) -> String {
    format!(
        "{ERROR_PAGE_HEAD}            <h4>{title}</h4>\n            <p>{message}</p>\n{ERROR_PAGE_TAIL}"
    )
}

/// A response the gateway answers with instead of forwarding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    content_type: &'static str,
    body: String,
}

impl Response {
    /// The 403 denial page for `denial`.
    pub fn denied(denial: &Denial) -> Self {
        Self {
            status: denial.status(),
            content_type: "text/html",
            body: render_error_page(denial.title(), denial.message()),
        }
    }

    /// A 500 response for configuration errors; carries no internal detail.
    pub fn server_error() -> Self {
        Self {
            status: 500,
            content_type: "text/plain",
            body: "Internal Server Error".to_string(),
        }
    }

    /// Returns the status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns the `Content-Type` value.
    pub fn content_type(&self) -> &'static str {
        self.content_type
    }

    /// Returns the body.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Consumes the response, returning the body.
    pub fn into_body(self) -> String {
        self.body
    }
}
