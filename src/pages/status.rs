//! Status overview, command endpoint and interactive shell.

use crate::context::PageContext;
use crate::escape::escape_html;
use crate::registry::PageEntry;
use crate::server::WebConsole;
use crate::shell::ShellExecutor;

/// `/status`: aggregate the output of the standard status commands into
/// fixed panels. A `cmd` query parameter re-executes one command on demand
/// and renders the result as an inline alert instead of a full reload.
pub fn handle_status(console: &WebConsole, _p: &PageEntry, c: &mut PageContext<'_>) {
    c.head(200, None);

    let cmd = c.getvar("cmd", 200);
    if !cmd.is_empty() {
        let output = console.shell.execute(&cmd);
        c.alert(
            "info",
            &format!(
                "<samp>{}</samp>\
                 <p><a class=\"btn btn-default\" target=\"#main\" href=\"/status\">Reload status</a></p>",
                escape_html(&output)
            ),
        );
    }

    c.print("<div class=\"row\"><div class=\"col-md-6\">");

    c.panel_start("primary", "Vehicle Status");
    let output = console.shell.execute("stat");
    c.print(&format!(
        "<samp class=\"monitor\" id=\"vehicle-status\" data-updcmd=\"stat\">{}</samp>",
        escape_html(&output)
    ));
    let output = console.shell.execute("location status");
    c.print(&format!("<samp>{}</samp>", escape_html(&output)));
    c.panel_end_with_footer(
        "<ul class=\"list-inline\">\
           <li><button type=\"button\" class=\"btn btn-default btn-sm\" data-target=\"#vehicle-status\" data-cmd=\"charge start\">Start charge</button></li>\
           <li><button type=\"button\" class=\"btn btn-default btn-sm\" data-target=\"#vehicle-status\" data-cmd=\"charge stop\">Stop charge</button></li>\
         </ul>",
    );

    c.print("</div><div class=\"col-md-6\">");

    c.panel_start("primary", "Server Status");
    let output = console.shell.execute("server v2 status");
    if !output.starts_with("Unrecognised") {
        c.print(&format!(
            "<samp class=\"monitor\" id=\"server-v2\" data-updcmd=\"server v2 status\">{}</samp>",
            escape_html(&output)
        ));
    }
    let output = console.shell.execute("server v3 status");
    if !output.starts_with("Unrecognised") {
        c.print(&format!(
            "<samp class=\"monitor\" id=\"server-v3\" data-updcmd=\"server v3 status\">{}</samp>",
            escape_html(&output)
        ));
    }
    c.panel_end_with_footer(
        "<ul class=\"list-inline\">\
           <li><button type=\"button\" class=\"btn btn-default btn-sm\" data-target=\"#server-v2\" data-cmd=\"server v2 start\">Start V2</button></li>\
           <li><button type=\"button\" class=\"btn btn-default btn-sm\" data-target=\"#server-v2\" data-cmd=\"server v2 stop\">Stop V2</button></li>\
           <li><button type=\"button\" class=\"btn btn-default btn-sm\" data-target=\"#server-v3\" data-cmd=\"server v3 start\">Start V3</button></li>\
           <li><button type=\"button\" class=\"btn btn-default btn-sm\" data-target=\"#server-v3\" data-cmd=\"server v3 stop\">Stop V3</button></li>\
         </ul>",
    );

    c.print("</div></div>");
    c.print("<div class=\"row\"><div class=\"col-md-6\">");

    c.panel_start("primary", "Wifi Status");
    let output = console.shell.execute("wifi status");
    c.print(&format!("<samp>{}</samp>", escape_html(&output)));
    c.panel_end();

    c.print("</div><div class=\"col-md-6\">");

    c.panel_start("primary", "Modem Status");
    let output = console.shell.execute("modem status");
    c.print(&format!("<samp>{}</samp>", escape_html(&output)));
    c.panel_end();

    c.print("</div></div>");
    c.print("<div class=\"row\"><div class=\"col-md-12\">");

    c.panel_start("primary", "Firmware Status");
    let output = console.shell.execute("ota status");
    c.print(&format!("<samp>{}</samp>", escape_html(&output)));
    c.panel_end();

    c.print("</div></div>");

    c.done();
}

/// `/api/execute`: execute one command and send its output. Plain text by
/// default; HTML-encoded with parameter `encode=html`.
pub fn handle_command(console: &WebConsole, _p: &PageEntry, c: &mut PageContext<'_>) {
    let command = c.getvar("command", 200);
    let output = console.shell.execute(&command);
    if c.getvar("encode", 10) == "html" {
        c.head(200, None);
        let encoded = escape_html(&output);
        c.print(&encoded);
    } else {
        c.head(
            200,
            Some(
                "Content-Type: text/plain; charset=utf-8\r\n\
                 Cache-Control: no-cache",
            ),
        );
        c.print(&output);
    }
    c.done();
}

/// `/shell`: interactive command shell. The form submits to `/api/execute`
/// through the page script; a plain POST to this page still works and
/// renders the output inline.
pub fn handle_shell(console: &WebConsole, _p: &PageEntry, c: &mut PageContext<'_>) {
    let command = c.getvar("command", 200);
    let output = if command.is_empty() {
        String::new()
    } else {
        console.shell.execute(&command)
    };

    c.head(200, None);
    c.panel_start("primary", "Shell");
    c.print(&format!(
        "<pre id=\"output\">{}</pre>\
         <form id=\"shellform\" method=\"post\" action=\"#\">\
           <div class=\"input-group\">\
             <label class=\"input-group-addon hidden-xs\" for=\"input-command\">VTU&nbsp;&gt;&nbsp;</label>\
             <input type=\"text\" class=\"form-control font-monospace\" placeholder=\"Enter command\" \
                    name=\"command\" id=\"input-command\" value=\"{}\">\
             <div class=\"input-group-btn\">\
               <button type=\"submit\" class=\"btn btn-default\">Execute</button>\
             </div>\
           </div>\
         </form>\
         <script>\
         document.getElementById(\"shellform\").addEventListener(\"submit\", function(ev) {{\
           ev.preventDefault();\
           var input = document.getElementById(\"input-command\");\
           var output = document.getElementById(\"output\");\
           var prompt = document.createElement(\"strong\");\
           prompt.textContent = \"VTU > \";\
           var kbd = document.createElement(\"kbd\");\
           kbd.textContent = input.value;\
           output.appendChild(prompt);\
           output.appendChild(kbd);\
           output.appendChild(document.createTextNode(\"\\n\"));\
           fetch(\"/api/execute\", {{\
             method: \"post\",\
             credentials: \"same-origin\",\
             headers: {{ \"Content-Type\": \"application/x-www-form-urlencoded\" }},\
             body: \"command=\" + encodeURIComponent(input.value)\
           }})\
             .then(function(r) {{ return r.text(); }})\
             .then(function(text) {{\
               output.appendChild(document.createTextNode(text));\
               output.scrollTop = output.scrollHeight;\
             }});\
         }});\
         document.getElementById(\"input-command\").focus();\
         </script>",
        escape_html(&output),
        escape_html(&command)
    ));
    c.panel_end();
    c.done();
}
