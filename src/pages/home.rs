//! Root framework page, home menu, navigation fragment and session pages.

use crate::config::ConfigStore;
use crate::context::PageContext;
use crate::escape::escape_html;
use crate::registry::{PageEntry, PageMenu};
use crate::server::{WebConsole, SESSION_AUTHENTICATED, SESSION_COOKIE};
use crate::transport::Method;
use crate::vehicle::VehicleFactory;

/// Build the navigation menu from the live page registry, filtered by menu
/// category and the current auth state.
pub fn create_menu(console: &WebConsole, c: &PageContext<'_>) -> String {
    let mut main = String::new();
    let mut config = String::new();
    let mut vehicle = String::new();

    for e in console.pages().iter() {
        let item = format!(
            "<li><a href=\"{}\" target=\"#main\">{}</a></li>",
            e.uri, e.label
        );
        match e.menu {
            PageMenu::Main => main.push_str(&item),
            PageMenu::Config => config.push_str(&item),
            PageMenu::Vehicle => vehicle.push_str(&item),
            PageMenu::None => {}
        }
    }

    let mut menu = format!(
        "<ul class=\"nav navbar-nav\">\
           {main}\
           <li class=\"dropdown\" id=\"menu-cfg\">\
             <a href=\"#\" class=\"dropdown-toggle\" data-toggle=\"dropdown\" role=\"button\" \
                aria-haspopup=\"true\" aria-expanded=\"false\">Config <span class=\"caret\"></span></a>\
             <ul class=\"dropdown-menu\">{config}</ul>\
           </li>",
        main = main,
        config = config,
    );
    if !vehicle.is_empty() {
        let vehiclename = console
            .vehicles
            .active_vehicle_name()
            .unwrap_or_else(|| "Vehicle".to_string());
        menu.push_str(&format!(
            "<li class=\"dropdown\" id=\"menu-vehicle\">\
               <a href=\"#\" class=\"dropdown-toggle\" data-toggle=\"dropdown\" role=\"button\" \
                  aria-haspopup=\"true\" aria-expanded=\"false\">{} <span class=\"caret\"></span></a>\
               <ul class=\"dropdown-menu\">{}</ul>\
             </li>",
            escape_html(&vehiclename),
            vehicle
        ));
    }
    menu.push_str(&format!(
        "</ul><ul class=\"nav navbar-nav navbar-right\">{}</ul>",
        if c.session {
            "<li><a href=\"/logout\" target=\"#main\">Logout</a></li>"
        } else {
            "<li><a href=\"/login\" target=\"#main\">Login</a></li>"
        }
    ));
    menu
}

/// Home page body: button lists per menu category, plus an open-access
/// warning while no admin password is set. Also rendered as the secondary
/// fragment after successful configuration changes.
pub fn output_home(console: &WebConsole, c: &mut PageContext<'_>) {
    let mut main = String::new();
    let mut config = String::new();
    let mut vehicle = String::new();

    for e in console.pages().iter() {
        let item = format!(
            "<li><a class=\"btn btn-default\" href=\"{}\" target=\"#main\">{}</a></li>",
            e.uri, e.label
        );
        match e.menu {
            PageMenu::Main => main.push_str(&item),
            PageMenu::Config => config.push_str(&item),
            PageMenu::Vehicle => vehicle.push_str(&item),
            PageMenu::None => {}
        }
    }

    c.panel_start("primary", "Home");
    c.print(&format!(
        "<fieldset><legend>Main menu</legend>\
         <ul class=\"list-inline\">{}</ul>\
         </fieldset>\
         <fieldset><legend>Configuration</legend>\
         <ul class=\"list-inline\">{}</ul>\
         </fieldset>",
        main, config
    ));
    if !vehicle.is_empty() {
        let vehiclename = console
            .vehicles
            .active_vehicle_name()
            .unwrap_or_else(|| "Vehicle".to_string());
        c.print(&format!(
            "<fieldset><legend>{}</legend>\
             <ul class=\"list-inline\">{}</ul>\
             </fieldset>",
            escape_html(&vehiclename),
            vehicle
        ));
    }
    c.panel_end();

    if console.config.get_or("password", "module", "").is_empty() {
        c.alert(
            "warning",
            "<p><strong>Warning:</strong> no admin password set. Web access is open to the public.</p>",
        );
    }
}

/// `/`: output the page framework and main menu; the script then loads
/// `/home` into the content area.
pub fn handle_root(console: &WebConsole, _p: &PageEntry, c: &mut PageContext<'_>) {
    let menu = create_menu(console, c);
    c.head(200, None);
    c.print(&format!(
        "<!DOCTYPE html>\
         <html lang=\"en\">\
           <head>\
             <meta charset=\"utf-8\">\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
             <title>VTU Console</title>\
             <link href=\"/assets/style.css\" rel=\"stylesheet\">\
           </head>\
           <body>\
             <nav id=\"nav\" class=\"navbar navbar-inverse navbar-fixed-top\">\
               <div class=\"container-fluid\">\
                 <div class=\"navbar-header\">\
                   <a class=\"navbar-brand\" href=\"/home\" target=\"#main\" title=\"Home\">VTU</a>\
                 </div>\
                 <div id=\"menu\" class=\"navbar-collapse collapse\">{}</div>\
               </div>\
             </nav>\
             <div id=\"main\" class=\"container-fluid\" role=\"main\" style=\"margin-top:60px\"></div>\
             <script src=\"/assets/script.js\"></script>\
           </body>\
         </html>",
        menu
    ));
    c.done();
}

/// `/home`: show the intro menu.
pub fn handle_home(console: &WebConsole, _p: &PageEntry, c: &mut PageContext<'_>) {
    c.head(200, None);
    c.alert("info", "<p class=\"lead\">Welcome to the VTU web console.</p>");
    output_home(console, c);
    c.done();
}

/// `/menu`: navigation fragment, reloaded by the client after auth or
/// vehicle changes.
pub fn handle_menu(console: &WebConsole, _p: &PageEntry, c: &mut PageContext<'_>) {
    let menu = create_menu(console, c);
    c.head(200, None);
    c.print(&menu);
    c.done();
}

fn output_login_form(p: &PageEntry, c: &mut PageContext<'_>) {
    c.panel_start("primary", "Login");
    c.form_start(p.uri);
    c.input_password("Admin password", "password", "", None, None);
    c.input_button("default", "Login");
    c.form_end();
    c.panel_end();
}

/// `/login`: check the admin password and set the session cookie. While no
/// admin password is stored, access is open and any login succeeds.
pub fn handle_login(console: &WebConsole, p: &PageEntry, c: &mut PageContext<'_>) {
    if c.method == Method::Post {
        let password = c.getvar("password", 200);
        let stored = console.config.get_or("password", "module", "");
        if stored.is_empty() || password == stored {
            c.session = true;
            c.head(
                200,
                Some(&format!(
                    "Content-Type: text/html; charset=utf-8\r\n\
                     Cache-Control: no-cache\r\n\
                     Set-Cookie: {}={}; Path=/",
                    SESSION_COOKIE, SESSION_AUTHENTICATED
                )),
            );
            c.alert("success", "<p class=\"lead\">Login successful.</p>");
            c.print("<script>loadMenu()</script>");
            output_home(console, c);
            c.done();
            return;
        }
        c.head(400, None);
        c.alert(
            "danger",
            "<p class=\"lead\">Error!</p>\
             <ul class=\"errorlist\"><li data-input=\"password\">Password is not correct</li></ul>",
        );
    } else {
        c.head(200, None);
    }

    output_login_form(p, c);
    c.done();
}

/// `/logout`: clear the session cookie.
pub fn handle_logout(_console: &WebConsole, _p: &PageEntry, c: &mut PageContext<'_>) {
    c.session = false;
    c.head(
        200,
        Some(&format!(
            "Content-Type: text/html; charset=utf-8\r\n\
             Cache-Control: no-cache\r\n\
             Set-Cookie: {}=; Path=/; Max-Age=0",
            SESSION_COOKIE
        )),
    );
    c.alert("info", "<p class=\"lead\">Logged out.</p>");
    c.print("<script>loadMenu()</script>");
    c.done();
}
