//! Per-request page context.
//!
//! A [`PageContext`] is created fresh for each inbound request, owned
//! exclusively by the handler invocation, and dropped when the response is
//! complete. It mediates all I/O for the exchange: form variable access,
//! response header emission, chunked body streaming, and the shared Bootstrap
//! widget fragments every page is assembled from.
//!
//! Protocol obligations on handlers: [`head`](PageContext::head) exactly once
//! before any body write, [`done`](PageContext::done) exactly once as the
//! final action on every code path. The select widget triple
//! ([`input_select_start`](PageContext::input_select_start) /
//! [`input_select_option`](PageContext::input_select_option) /
//! [`input_select_end`](PageContext::input_select_end)) must not have other
//! writes interleaved.

use crate::escape::escape_html;
use crate::transport::{self, Connection, Method, Request};

/// Facade over one HTTP exchange plus HTML rendering helpers.
pub struct PageContext<'a> {
    pub method: Method,
    pub uri: String,
    /// Authenticated-session flag, derived from the session cookie.
    pub session: bool,
    query: String,
    body: String,
    conn: &'a mut dyn Connection,
}

impl<'a> PageContext<'a> {
    pub fn new(req: &Request, session: bool, conn: &'a mut dyn Connection) -> Self {
        PageContext {
            method: req.method,
            uri: req.uri.clone(),
            session,
            query: req.query.clone(),
            body: req.body.clone(),
            conn,
        }
    }

    /// Extract a submitted form variable from the POST body or, failing that,
    /// the query string. Absent variables read as the empty string; values are
    /// hard-capped at `maxlen` bytes (a bound, not an error).
    pub fn getvar(&self, name: &str, maxlen: usize) -> String {
        let mut value = transport::get_form_var(&self.body, name)
            .or_else(|| transport::get_form_var(&self.query, name))
            .unwrap_or_default();
        if value.len() > maxlen {
            let mut cut = maxlen;
            while !value.is_char_boundary(cut) {
                cut -= 1;
            }
            value.truncate(cut);
        }
        value
    }

    /// Emit the status line and header block, followed by the start of the
    /// chunked body. `headers` defaults to HTML content with caching disabled.
    /// Must be called exactly once per response, before any body bytes.
    pub fn head(&mut self, code: u16, headers: Option<&str>) {
        let headers = headers.unwrap_or(
            "Content-Type: text/html; charset=utf-8\r\n\
             Cache-Control: no-cache",
        );
        let head = format!(
            "HTTP/1.1 {} {}\r\n{}\r\nTransfer-Encoding: chunked\r\n\r\n",
            code,
            transport::status_text(code),
            headers
        );
        self.conn.send(head.as_bytes());
    }

    /// Append one chunk of body data.
    pub fn print(&mut self, text: &str) {
        self.write_chunk(text.as_bytes());
    }

    /// Emit the terminating zero-length chunk. Must be the final I/O action
    /// of every handler, on every code path.
    pub fn done(&mut self) {
        self.conn.send(b"0\r\n\r\n");
    }

    /// Emit a minimal non-chunked error response in place of a page
    /// (unknown assets and the like). Excludes `head`/`done`.
    pub fn error(&mut self, code: u16, text: &str) {
        transport::send_error(self.conn, code, text);
    }

    pub fn write_chunk(&mut self, data: &[u8]) {
        if data.is_empty() {
            return; // an empty chunk would terminate the body
        }
        self.conn.send(format!("{:x}\r\n", data.len()).as_bytes());
        self.conn.send(data);
        self.conn.send(b"\r\n");
    }

    // ------------------------------------------------------------------
    // Bootstrap widget fragments
    // ------------------------------------------------------------------

    pub fn panel_start(&mut self, kind: &str, title: &str) {
        self.print(&format!(
            "<div class=\"panel panel-{}\">\
               <div class=\"panel-heading\">{}</div>\
               <div class=\"panel-body\">",
            escape_html(kind),
            title
        ));
    }

    pub fn panel_end(&mut self) {
        self.print("</div></div>");
    }

    pub fn panel_end_with_footer(&mut self, footer: &str) {
        if footer.is_empty() {
            self.panel_end();
        } else {
            self.print(&format!(
                "</div><div class=\"panel-footer\">{}</div></div>",
                footer
            ));
        }
    }

    pub fn form_start(&mut self, action: &str) {
        self.print(&format!(
            "<form class=\"form-horizontal\" method=\"post\" action=\"{}\" target=\"#main\">",
            escape_html(action)
        ));
    }

    pub fn form_end(&mut self) {
        self.print("</form>");
    }

    fn input(
        &mut self,
        kind: &str,
        label: &str,
        name: &str,
        value: &str,
        placeholder: Option<&str>,
        helptext: Option<&str>,
    ) {
        let placeholder = match placeholder {
            Some(p) => escape_html(p),
            None => format!("Enter {}", escape_html(label)),
        };
        let help = match helptext {
            Some(h) => format!("<span class=\"help-block\">{}</span>", h),
            None => String::new(),
        };
        self.print(&format!(
            "<div class=\"form-group\">\
               <label class=\"control-label col-sm-3\" for=\"input-{name}\">{label}:</label>\
               <div class=\"col-sm-9\">\
                 <input type=\"{kind}\" class=\"form-control\" placeholder=\"{placeholder}\" \
                        name=\"{name}\" id=\"input-{name}\" value=\"{value}\">\
                 {help}\
               </div>\
             </div>",
            kind = escape_html(kind),
            label = label,
            name = escape_html(name),
            placeholder = placeholder,
            value = escape_html(value),
            help = help,
        ));
    }

    pub fn input_text(
        &mut self,
        label: &str,
        name: &str,
        value: &str,
        placeholder: Option<&str>,
        helptext: Option<&str>,
    ) {
        self.input("text", label, name, value, placeholder, helptext);
    }

    pub fn input_password(
        &mut self,
        label: &str,
        name: &str,
        value: &str,
        placeholder: Option<&str>,
        helptext: Option<&str>,
    ) {
        self.input("password", label, name, value, placeholder, helptext);
    }

    /// Open a `<select>` widget. Pair with
    /// [`input_select_end`](Self::input_select_end); emit only
    /// [`input_select_option`](Self::input_select_option) calls in between.
    pub fn input_select_start(&mut self, label: &str, name: &str) {
        self.print(&format!(
            "<div class=\"form-group\">\
               <label class=\"control-label col-sm-3\" for=\"input-{name}\">{label}:</label>\
               <div class=\"col-sm-9\">\
                 <select class=\"form-control\" size=\"1\" name=\"{name}\" id=\"input-{name}\">",
            label = label,
            name = escape_html(name),
        ));
    }

    pub fn input_select_option(&mut self, label: &str, value: &str, selected: bool) {
        self.print(&format!(
            "<option value=\"{}\"{}>{}</option>",
            escape_html(value),
            if selected { " selected" } else { "" },
            label
        ));
    }

    pub fn input_select_end(&mut self) {
        self.print("</select></div></div>");
    }

    pub fn input_checkbox(&mut self, label: &str, name: &str, value: bool, helptext: Option<&str>) {
        let help = match helptext {
            Some(h) => format!("<span class=\"help-block\">{}</span>", h),
            None => String::new(),
        };
        self.print(&format!(
            "<div class=\"form-group\">\
               <div class=\"col-sm-9 col-sm-offset-3\">\
                 <div class=\"checkbox\">\
                   <label><input type=\"checkbox\" name=\"{}\" value=\"yes\" {}> {}</label>\
                 </div>\
                 {}\
               </div>\
             </div>",
            escape_html(name),
            if value { "checked" } else { "" },
            label,
            help,
        ));
    }

    pub fn input_button(&mut self, kind: &str, label: &str) {
        self.print(&format!(
            "<div class=\"form-group\">\
               <div class=\"col-sm-offset-3 col-sm-9\">\
                 <button type=\"submit\" class=\"btn btn-{}\">{}</button>\
               </div>\
             </div>",
            escape_html(kind),
            label
        ));
    }

    pub fn alert(&mut self, kind: &str, text: &str) {
        self.print(&format!(
            "<div class=\"alert alert-{}\">{}</div>",
            escape_html(kind),
            text
        ));
    }

    pub fn fieldset_start(&mut self, title: &str) {
        self.print(&format!("<fieldset><legend>{}</legend>", title));
    }

    pub fn fieldset_end(&mut self) {
        self.print("</fieldset>");
    }

    pub fn hr(&mut self) {
        self.print("<hr>");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{Method, Request};

    fn context<'a>(req: &Request, out: &'a mut Vec<u8>) -> PageContext<'a> {
        PageContext::new(req, false, out)
    }

    #[test]
    fn test_getvar_body_wins_over_query() {
        let req = Request {
            query: "cmd=stat".into(),
            ..Request::new(Method::Post, "/status", "cmd=wifi+status")
        };
        let mut out = Vec::new();
        let c = context(&req, &mut out);
        assert_eq!(c.getvar("cmd", 200), "wifi status");
    }

    #[test]
    fn test_getvar_absent_is_empty() {
        let req = Request::new(Method::Get, "/status", "");
        let mut out = Vec::new();
        let c = context(&req, &mut out);
        assert_eq!(c.getvar("cmd", 200), "");
    }

    #[test]
    fn test_getvar_enforces_maxlen() {
        let req = Request::new(Method::Post, "/shell", "command=aaaaaaaaaa");
        let mut out = Vec::new();
        let c = context(&req, &mut out);
        assert_eq!(c.getvar("command", 4), "aaaa");
    }

    #[test]
    fn test_getvar_maxlen_respects_char_boundary() {
        let req = Request::new(Method::Post, "/shell", "command=a%C3%9Fc");
        let mut out = Vec::new();
        let c = context(&req, &mut out);
        // "aßc": cutting at byte 2 would split the ß
        assert_eq!(c.getvar("command", 2), "a");
    }

    #[test]
    fn test_head_defaults_and_chunked_body() {
        let req = Request::new(Method::Get, "/home", "");
        let mut out = Vec::new();
        {
            let mut c = context(&req, &mut out);
            c.head(200, None);
            c.print("hello");
            c.done();
        }
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Content-Type: text/html; charset=utf-8\r\n"));
        assert!(text.contains("Cache-Control: no-cache\r\n"));
        assert!(text.contains("Transfer-Encoding: chunked\r\n"));
        assert!(text.contains("\r\n\r\n5\r\nhello\r\n0\r\n\r\n"));
    }

    #[test]
    fn test_empty_print_does_not_terminate_body() {
        let req = Request::new(Method::Get, "/home", "");
        let mut out = Vec::new();
        {
            let mut c = context(&req, &mut out);
            c.head(200, None);
            c.print("");
            c.print("x");
            c.done();
        }
        let text = String::from_utf8(out).unwrap();
        let body = text.splitn(2, "\r\n\r\n").nth(1).unwrap();
        assert_eq!(body, "1\r\nx\r\n0\r\n\r\n");
    }

    #[test]
    fn test_input_escapes_value_attribute() {
        let req = Request::new(Method::Get, "/cfg/vehicle", "");
        let mut out = Vec::new();
        {
            let mut c = context(&req, &mut out);
            c.head(200, None);
            c.input_text("Vehicle name", "vehiclename", "my \"car\"", None, None);
            c.done();
        }
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("value=\"my &quot;car&quot;\""));
        assert!(text.contains("placeholder=\"Enter Vehicle name\""));
    }

    #[test]
    fn test_select_triple_is_well_formed() {
        let req = Request::new(Method::Get, "/cfg/vehicle", "");
        let mut out = Vec::new();
        {
            let mut c = context(&req, &mut out);
            c.head(200, None);
            c.input_select_start("Vehicle type", "vehicletype");
            c.input_select_option("Demo Vehicle", "DEMO", true);
            c.input_select_option("None", "NONE", false);
            c.input_select_end();
            c.done();
        }
        let text = String::from_utf8(out).unwrap();
        let select = text.find("<select").unwrap();
        let option = text.find("<option value=\"DEMO\" selected>").unwrap();
        let close = text.find("</select>").unwrap();
        assert!(select < option && option < close);
        assert!(text.contains("<option value=\"NONE\">None</option>"));
    }

    #[test]
    fn test_checkbox_yes_convention() {
        let req = Request::new(Method::Get, "/cfg/modem", "");
        let mut out = Vec::new();
        {
            let mut c = context(&req, &mut out);
            c.head(200, None);
            c.input_checkbox("Enable SMS", "enable_sms", true, None);
            c.input_checkbox("Enable GPS", "enable_gps", false, None);
            c.done();
        }
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("name=\"enable_sms\" value=\"yes\" checked"));
        assert!(text.contains("name=\"enable_gps\" value=\"yes\" >"));
    }

    #[test]
    fn test_panel_footer_variants() {
        let req = Request::new(Method::Get, "/status", "");
        let mut out = Vec::new();
        {
            let mut c = context(&req, &mut out);
            c.head(200, None);
            c.panel_start("primary", "Status");
            c.panel_end_with_footer("<ul class=\"list-inline\"></ul>");
            c.panel_start("primary", "Plain");
            c.panel_end_with_footer("");
            c.done();
        }
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("</div><div class=\"panel-footer\">"));
        assert!(text.contains("<div class=\"panel-body\">"));
    }
}
