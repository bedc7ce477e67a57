//! Configuration pages. Each handler follows the same GET/POST shape:
//! a POST validates the submitted fields, persists them when the error
//! list is empty, and falls back to re-rendering the form with the
//! submitted values otherwise.

use crate::config::{ConfigError, ConfigStore, ParamMap};
use crate::context::PageContext;
use crate::escape::escape_html;
use crate::forms::{self, FormValidation};
use crate::pages::home::output_home;
use crate::registry::PageEntry;
use crate::server::WebConsole;
use crate::transport::Method;
use crate::vehicle::VehicleFactory;

fn store_failure(c: &mut PageContext<'_>, err: &ConfigError) {
    c.head(200, None);
    c.alert(
        "danger",
        &format!(
            "<p class=\"lead\">Error!</p><p>Configuration could not be saved: {}</p>",
            escape_html(&err.to_string())
        ),
    );
}

/// `/cfg/password`: change the module admin password.
pub fn handle_cfg_password(console: &WebConsole, _p: &PageEntry, c: &mut PageContext<'_>) {
    if c.method == Method::Post {
        let oldpass = c.getvar("oldpass", 40);
        let newpass1 = c.getvar("newpass1", 40);
        let newpass2 = c.getvar("newpass2", 40);

        let mut v = FormValidation::new();
        let stored = console.config.get_or("password", "module", "");
        if oldpass != stored {
            v.error("oldpass", "Old password is not correct");
        }
        if newpass1.is_empty() {
            v.error("newpass1", "New password must not be empty");
        }
        if newpass2 != newpass1 {
            v.error("newpass2", "Passwords do not match");
        }

        if v.ok() {
            match console.config.set("password", "module", &newpass1) {
                Ok(()) => {
                    c.head(200, None);
                    c.alert("success", "<p class=\"lead\">Password has been changed.</p>");
                    output_home(console, c);
                    c.done();
                    return;
                }
                Err(err) => store_failure(c, &err),
            }
        } else {
            c.head(400, None);
            c.alert("danger", &v.render_errors());
        }
    } else {
        c.head(200, None);
    }

    c.panel_start("primary", "Change module password");
    c.form_start("/cfg/password");
    c.input_password("Old password", "oldpass", "", None, None);
    c.input_password("New password", "newpass1", "", None, None);
    c.input_password("…repeat", "newpass2", "", Some("Repeat new password"), None);
    c.input_button("default", "Submit");
    c.form_end();
    c.panel_end();
    c.done();
}

/// `/cfg/vehicle`: vehicle type, ID and display name.
pub fn handle_cfg_vehicle(console: &WebConsole, _p: &PageEntry, c: &mut PageContext<'_>) {
    let vehicleid;
    let vehicletype;
    let vehiclename;

    if c.method == Method::Post {
        vehicleid = c.getvar("vehicleid", 32);
        vehicletype = c.getvar("vehicletype", 32);
        vehiclename = c.getvar("vehiclename", 64);

        let mut v = FormValidation::new();
        forms::check_vehicle_id(&mut v, "vehicleid", &vehicleid);
        let mut info = String::new();
        // no active vehicle reads as ""; an empty submission then means
        // "no change", not an activation attempt
        let active = console.vehicles.active_type().unwrap_or_default();
        if v.ok() && active != vehicletype {
            if console.vehicles.set_active(&vehicletype) {
                info = format!(
                    "<p class=\"lead\">New vehicle type <code>{}</code> has been set.</p>",
                    escape_html(&vehicletype)
                );
            } else {
                v.error(
                    "vehicletype",
                    &format!(
                        "Cannot set vehicle type <code>{}</code>",
                        escape_html(&vehicletype)
                    ),
                );
            }
        }

        if v.ok() {
            let saved = (|| -> Result<(), ConfigError> {
                console.config.set("vehicle", "id", &vehicleid)?;
                console.config.set("vehicle", "type", &vehicletype)?;
                console.config.set("vehicle", "name", &vehiclename)?;
                Ok(())
            })();
            match saved {
                Ok(()) => {
                    c.head(200, None);
                    c.alert("success", "<p class=\"lead\">Vehicle configuration saved.</p>");
                    if !info.is_empty() {
                        c.alert("info", &info);
                    }
                    c.print("<script>loadMenu()</script>");
                    output_home(console, c);
                    c.done();
                    return;
                }
                Err(err) => store_failure(c, &err),
            }
        } else {
            c.head(400, None);
            c.alert("danger", &v.render_errors());
        }
    } else {
        vehicleid = console.config.get_or("vehicle", "id", "");
        vehicletype = console.config.get_or("vehicle", "type", "");
        vehiclename = console.config.get_or("vehicle", "name", "");
        c.head(200, None);
    }

    c.panel_start("primary", "Vehicle configuration");
    c.form_start("/cfg/vehicle");
    c.input_select_start("Vehicle type", "vehicletype");
    c.input_select_option("&mdash;", "", vehicletype.is_empty());
    for (type_id, name) in console.vehicles.types() {
        let selected = type_id == vehicletype;
        c.input_select_option(&name, &type_id, selected);
    }
    c.input_select_end();
    c.input_text(
        "Vehicle ID",
        "vehicleid",
        &vehicleid,
        Some("Use upper case letters and digits"),
        Some("Server account name and global vehicle identifier"),
    );
    c.input_text(
        "Vehicle name",
        "vehiclename",
        &vehiclename,
        Some("optional, e.g. \"Red Roadster\""),
        Some("Display name for the web console"),
    );
    c.input_button("default", "Save");
    c.form_end();
    c.panel_end();
    c.done();
}

/// `/cfg/modem`: APN account and modem feature switches. No field
/// validation; everything submitted is persisted.
pub fn handle_cfg_modem(console: &WebConsole, _p: &PageEntry, c: &mut PageContext<'_>) {
    let apn;
    let apn_user;
    let apn_pass;
    let enable_net;
    let enable_sms;
    let enable_gps;
    let enable_gpstime;

    if c.method == Method::Post {
        apn = c.getvar("apn", 64);
        apn_user = c.getvar("apn_user", 32);
        apn_pass = c.getvar("apn_pass", 32);
        enable_net = forms::checkbox(&c.getvar("enable_net", 5));
        enable_sms = forms::checkbox(&c.getvar("enable_sms", 5));
        enable_gps = forms::checkbox(&c.getvar("enable_gps", 5));
        enable_gpstime = forms::checkbox(&c.getvar("enable_gpstime", 5));

        let saved = (|| -> Result<(), ConfigError> {
            console.config.set("modem", "apn", &apn)?;
            console.config.set("modem", "apn.user", &apn_user)?;
            console.config.set("modem", "apn.password", &apn_pass)?;
            console.config.set_bool("modem", "enable.net", enable_net)?;
            console.config.set_bool("modem", "enable.sms", enable_sms)?;
            console.config.set_bool("modem", "enable.gps", enable_gps)?;
            console.config.set_bool("modem", "enable.gpstime", enable_gpstime)?;
            Ok(())
        })();
        match saved {
            Ok(()) => {
                c.head(200, None);
                c.alert("success", "<p class=\"lead\">Modem configured.</p>");
                output_home(console, c);
                c.done();
                return;
            }
            Err(err) => store_failure(c, &err),
        }
    } else {
        apn = console.config.get_or("modem", "apn", "");
        apn_user = console.config.get_or("modem", "apn.user", "");
        apn_pass = console.config.get_or("modem", "apn.password", "");
        enable_net = console.config.get_bool("modem", "enable.net", true);
        enable_sms = console.config.get_bool("modem", "enable.sms", true);
        enable_gps = console.config.get_bool("modem", "enable.gps", false);
        enable_gpstime = console.config.get_bool("modem", "enable.gpstime", false);
        c.head(200, None);
    }

    c.panel_start("primary", "Modem configuration");
    c.form_start("/cfg/modem");
    c.input_text("APN", "apn", &apn, None, Some("Access point name of your mobile provider"));
    c.input_text("…username", "apn_user", &apn_user, None, None);
    c.input_text("…password", "apn_pass", &apn_pass, None, None);
    c.input_checkbox("Enable IP networking (data)", "enable_net", enable_net, None);
    c.input_checkbox("Enable SMS", "enable_sms", enable_sms, None);
    c.input_checkbox("Enable GPS", "enable_gps", enable_gps, None);
    c.input_checkbox("Use GPS time as module time", "enable_gpstime", enable_gpstime, None);
    c.input_button("default", "Save");
    c.form_end();
    c.panel_end();
    c.done();
}

/// `/cfg/server/v2`: MP protocol server connection.
pub fn handle_cfg_server_v2(console: &WebConsole, _p: &PageEntry, c: &mut PageContext<'_>) {
    let server;
    let password;
    let port;
    let updatetime_connected;
    let updatetime_idle;

    if c.method == Method::Post {
        server = c.getvar("server", 64);
        password = c.getvar("password", 64);
        port = c.getvar("port", 6);
        updatetime_connected = c.getvar("updatetime_connected", 10);
        updatetime_idle = c.getvar("updatetime_idle", 10);

        let mut v = FormValidation::new();
        forms::check_port(&mut v, "port", &port);
        forms::check_interval(&mut v, "updatetime_connected", &updatetime_connected, "connected");
        forms::check_interval(&mut v, "updatetime_idle", &updatetime_idle, "idle");

        if v.ok() {
            let saved = (|| -> Result<(), ConfigError> {
                console.config.set("server.v2", "server", &server)?;
                console.config.set("server.v2", "port", &port)?;
                if !password.is_empty() {
                    console.config.set("server.v2", "password", &password)?;
                }
                console
                    .config
                    .set("server.v2", "updatetime.connected", &updatetime_connected)?;
                console
                    .config
                    .set("server.v2", "updatetime.idle", &updatetime_idle)?;
                Ok(())
            })();
            match saved {
                Ok(()) => {
                    c.head(200, None);
                    c.alert(
                        "success",
                        "<p class=\"lead\">Server V2 (MP) connection configured.</p>",
                    );
                    output_home(console, c);
                    c.done();
                    return;
                }
                Err(err) => store_failure(c, &err),
            }
        } else {
            c.head(400, None);
            c.alert("danger", &v.render_errors());
        }
    } else {
        server = console.config.get_or("server.v2", "server", "");
        password = String::new();
        port = console.config.get_or("server.v2", "port", "");
        updatetime_connected = console.config.get_or("server.v2", "updatetime.connected", "");
        updatetime_idle = console.config.get_or("server.v2", "updatetime.idle", "");
        c.head(200, None);
    }

    c.panel_start("primary", "Server V2 (MP) configuration");
    c.form_start("/cfg/server/v2");
    c.input_text(
        "Server",
        "server",
        &server,
        Some("Enter host name or IP address"),
        None,
    );
    c.input_password(
        "Server password",
        "password",
        &password,
        None,
        Some("Leave empty to keep the current password"),
    );
    c.input_text("Port", "port", &port, Some("optional, default: 6867"), None);
    c.input_text(
        "Update interval (connected)",
        "updatetime_connected",
        &updatetime_connected,
        Some("optional, in seconds, default: 60"),
        None,
    );
    c.input_text(
        "Update interval (idle)",
        "updatetime_idle",
        &updatetime_idle,
        Some("optional, in seconds, default: 600"),
        None,
    );
    c.input_button("default", "Save");
    c.form_end();
    c.panel_end();
    c.done();
}

/// `/cfg/server/v3`: MQTT server connection.
pub fn handle_cfg_server_v3(console: &WebConsole, _p: &PageEntry, c: &mut PageContext<'_>) {
    let server;
    let user;
    let password;
    let port;
    let updatetime_connected;
    let updatetime_idle;

    if c.method == Method::Post {
        server = c.getvar("server", 64);
        user = c.getvar("user", 64);
        password = c.getvar("password", 64);
        port = c.getvar("port", 6);
        updatetime_connected = c.getvar("updatetime_connected", 10);
        updatetime_idle = c.getvar("updatetime_idle", 10);

        let mut v = FormValidation::new();
        forms::check_port(&mut v, "port", &port);
        forms::check_interval(&mut v, "updatetime_connected", &updatetime_connected, "connected");
        forms::check_interval(&mut v, "updatetime_idle", &updatetime_idle, "idle");

        if v.ok() {
            let saved = (|| -> Result<(), ConfigError> {
                console.config.set("server.v3", "server", &server)?;
                console.config.set("server.v3", "user", &user)?;
                console.config.set("server.v3", "port", &port)?;
                if !password.is_empty() {
                    console.config.set("server.v3", "password", &password)?;
                }
                console
                    .config
                    .set("server.v3", "updatetime.connected", &updatetime_connected)?;
                console
                    .config
                    .set("server.v3", "updatetime.idle", &updatetime_idle)?;
                Ok(())
            })();
            match saved {
                Ok(()) => {
                    c.head(200, None);
                    c.alert(
                        "success",
                        "<p class=\"lead\">Server V3 (MQTT) connection configured.</p>",
                    );
                    output_home(console, c);
                    c.done();
                    return;
                }
                Err(err) => store_failure(c, &err),
            }
        } else {
            c.head(400, None);
            c.alert("danger", &v.render_errors());
        }
    } else {
        server = console.config.get_or("server.v3", "server", "");
        user = console.config.get_or("server.v3", "user", "");
        password = String::new();
        port = console.config.get_or("server.v3", "port", "");
        updatetime_connected = console.config.get_or("server.v3", "updatetime.connected", "");
        updatetime_idle = console.config.get_or("server.v3", "updatetime.idle", "");
        c.head(200, None);
    }

    c.panel_start("primary", "Server V3 (MQTT) configuration");
    c.form_start("/cfg/server/v3");
    c.input_text(
        "Server",
        "server",
        &server,
        Some("Enter host name or IP address"),
        None,
    );
    c.input_text("Username", "user", &user, Some("Enter user login name"), None);
    c.input_password(
        "Password",
        "password",
        &password,
        Some("Enter user password"),
        Some("Leave empty to keep the current password"),
    );
    c.input_text("Port", "port", &port, Some("optional, default: 1883"), None);
    c.input_text(
        "Update interval (connected)",
        "updatetime_connected",
        &updatetime_connected,
        Some("optional, in seconds, default: 60"),
        None,
    );
    c.input_text(
        "Update interval (idle)",
        "updatetime_idle",
        &updatetime_idle,
        Some("optional, in seconds, default: 600"),
        None,
    );
    c.input_button("default", "Save");
    c.form_end();
    c.panel_end();
    c.done();
}

/// `/cfg/webserver`: document root, directory options and authentication.
pub fn handle_cfg_webserver(console: &WebConsole, _p: &PageEntry, c: &mut PageContext<'_>) {
    let docroot;
    let auth_domain;
    let auth_file;
    let enable_files;
    let enable_dirlist;
    let auth_global;

    if c.method == Method::Post {
        docroot = c.getvar("docroot", 80);
        auth_domain = c.getvar("auth_domain", 32);
        auth_file = c.getvar("auth_file", 80);
        enable_files = forms::checkbox(&c.getvar("enable_files", 5));
        enable_dirlist = forms::checkbox(&c.getvar("enable_dirlist", 5));
        auth_global = forms::checkbox(&c.getvar("auth_global", 5));

        let mut v = FormValidation::new();
        if !docroot.is_empty() && !docroot.starts_with('/') {
            v.error("docroot", "Document root must start with '/'");
        }
        if docroot == "/"
            || docroot == "/store"
            || docroot == "/store/"
            || docroot.starts_with("/store/console")
        {
            v.warn(
                "docroot",
                &format!(
                    "Document root <code>{}</code> exposes internal files to the web",
                    escape_html(&docroot)
                ),
            );
        }

        if v.ok() {
            let saved = (|| -> Result<(), ConfigError> {
                if docroot.is_empty() {
                    console.config.delete("http.server", "docroot")?;
                } else {
                    console.config.set("http.server", "docroot", &docroot)?;
                }
                if auth_domain.is_empty() {
                    console.config.delete("http.server", "auth.domain")?;
                } else {
                    console.config.set("http.server", "auth.domain", &auth_domain)?;
                }
                if auth_file.is_empty() {
                    console.config.delete("http.server", "auth.file")?;
                } else {
                    console.config.set("http.server", "auth.file", &auth_file)?;
                }
                console.config.set_bool("http.server", "enable.files", enable_files)?;
                console
                    .config
                    .set_bool("http.server", "enable.dirlist", enable_dirlist)?;
                console.config.set_bool("http.server", "auth.global", auth_global)?;
                Ok(())
            })();
            match saved {
                Ok(()) => {
                    c.head(200, None);
                    c.alert("success", "<p class=\"lead\">Webserver configuration saved.</p>");
                    if v.has_warnings() {
                        c.alert("warning", &v.render_warnings());
                    }
                    output_home(console, c);
                    c.done();
                    return;
                }
                Err(err) => store_failure(c, &err),
            }
        } else {
            c.head(400, None);
            c.alert("danger", &v.render_errors());
        }
    } else {
        docroot = console.config.get_or("http.server", "docroot", "");
        auth_domain = console.config.get_or("http.server", "auth.domain", "");
        auth_file = console.config.get_or("http.server", "auth.file", "");
        enable_files = console.config.get_bool("http.server", "enable.files", true);
        enable_dirlist = console.config.get_bool("http.server", "enable.dirlist", true);
        auth_global = console.config.get_bool("http.server", "auth.global", true);
        c.head(200, None);
    }

    c.panel_start("primary", "Webserver configuration");
    c.form_start("/cfg/webserver");
    c.input_checkbox("Enable file access", "enable_files", enable_files, None);
    c.input_text(
        "Root path",
        "docroot",
        &docroot,
        Some("optional, default: /sd"),
        None,
    );
    c.input_checkbox("Enable directory listings", "enable_dirlist", enable_dirlist, None);
    c.input_checkbox(
        "Enable global file authentication",
        "auth_global",
        auth_global,
        Some("If enabled, file access is globally protected by the module password."),
    );
    c.input_text(
        "…auth domain",
        "auth_domain",
        &auth_domain,
        Some("optional, default: vtu"),
        None,
    );
    c.input_text(
        "…auth file",
        "auth_file",
        &auth_file,
        Some("optional, default: .htpasswd in docroot"),
        None,
    );
    c.input_button("default", "Save");
    c.form_end();
    c.panel_end();
    c.done();
}

/// Collect the submitted rows of one wifi network table into a fresh map.
///
/// Row indices run from 1 to the hidden counter; rows deleted in the
/// browser simply come back empty and are dropped. An empty passphrase
/// keeps the stored one for that SSID; an SSID that ends up with no
/// passphrase at all is accepted with a warning.
fn update_wifi_table(
    console: &WebConsole,
    c: &PageContext<'_>,
    prefix: &str,
    paramname: &str,
    v: &mut FormValidation,
) -> ParamMap {
    let max: usize = c.getvar(prefix, 5).parse().unwrap_or(0);
    let current = console.config.cached_param(paramname);
    let mut newmap = ParamMap::new();
    for i in 1..=max {
        let ssid = c.getvar(&format!("{}_ssid_{}", prefix, i), 32);
        if ssid.is_empty() {
            continue;
        }
        let mut pass = c.getvar(&format!("{}_pass_{}", prefix, i), 64);
        if pass.is_empty() {
            pass = current.get(&ssid).cloned().unwrap_or_default();
        }
        if pass.is_empty() {
            v.warn(
                "",
                &format!("SSID <code>{}</code> has no password", escape_html(&ssid)),
            );
        }
        newmap.insert(ssid, pass);
    }
    newmap
}

fn output_wifi_table(c: &mut PageContext<'_>, title: &str, prefix: &str, map: &ParamMap) {
    c.fieldset_start(title);
    c.print(&format!(
        "<input type=\"hidden\" name=\"{prefix}\" value=\"{count}\">\
         <div class=\"table-responsive\">\
         <table class=\"table\" data-prefix=\"{prefix}\">\
         <thead><tr>\
           <th width=\"10%\"></th>\
           <th width=\"45%\">SSID</th>\
           <th width=\"45%\">Passphrase</th>\
         </tr></thead>\
         <tbody>",
        prefix = prefix,
        count = map.len(),
    ));
    for (i, ssid) in map.keys().enumerate() {
        c.print(&format!(
            "<tr>\
               <td><button type=\"button\" class=\"btn btn-danger\" onclick=\"delRow(this)\"><strong>&#x2716;</strong></button></td>\
               <td><input type=\"text\" class=\"form-control\" name=\"{prefix}_ssid_{i}\" value=\"{ssid}\"></td>\
               <td><input type=\"password\" class=\"form-control\" name=\"{prefix}_pass_{i}\" placeholder=\"no change\"></td>\
             </tr>",
            prefix = prefix,
            i = i + 1,
            ssid = escape_html(ssid),
        ));
    }
    c.print(
        "</tbody>\
         <tfoot><tr>\
           <td><button type=\"button\" class=\"btn btn-success\" onclick=\"addRow(this)\"><strong>&#x271A;</strong></button></td>\
           <td></td><td></td>\
         </tr></tfoot>\
         </table></div>",
    );
    c.fieldset_end();
}

/// `/cfg/wifi`: access point and client network credentials, edited as
/// dynamic-row tables and swapped in whole via `save_param`.
pub fn handle_cfg_wifi(console: &WebConsole, _p: &PageEntry, c: &mut PageContext<'_>) {
    if c.method == Method::Post {
        let mut v = FormValidation::new();
        let ap = update_wifi_table(console, c, "ap", "wifi.ap", &mut v);
        let cl = update_wifi_table(console, c, "cl", "wifi.ssid", &mut v);

        let saved = (|| -> Result<(), ConfigError> {
            console.config.save_param("wifi.ap", ap)?;
            console.config.save_param("wifi.ssid", cl)?;
            Ok(())
        })();
        match saved {
            Ok(()) => {
                c.head(200, None);
                c.alert("success", "<p class=\"lead\">Wifi configuration saved.</p>");
                if v.has_warnings() {
                    c.alert("warning", &v.render_warnings());
                }
                output_home(console, c);
                c.done();
                return;
            }
            Err(err) => store_failure(c, &err),
        }
    } else {
        c.head(200, None);
    }

    let ap = console.config.cached_param("wifi.ap");
    let cl = console.config.cached_param("wifi.ssid");

    c.panel_start("primary", "Wifi configuration");
    c.form_start("/cfg/wifi");
    output_wifi_table(c, "Access point networks", "ap", &ap);
    output_wifi_table(c, "Wifi client networks", "cl", &cl);
    c.input_button("default", "Save");
    c.form_end();
    c.print(
        "<script>\
         function addRow(btn) {\
           var table = btn.closest(\"table\");\
           var prefix = table.dataset.prefix;\
           var counter = document.getElementsByName(prefix)[0];\
           var next = parseInt(counter.value, 10) + 1;\
           counter.value = next;\
           var tr = document.createElement(\"tr\");\
           tr.innerHTML =\
             '<td><button type=\"button\" class=\"btn btn-danger\" onclick=\"delRow(this)\"><strong>&#x2716;</strong></button></td>' +\
             '<td><input type=\"text\" class=\"form-control\" name=\"' + prefix + '_ssid_' + next + '\"></td>' +\
             '<td><input type=\"password\" class=\"form-control\" name=\"' + prefix + '_pass_' + next + '\"></td>';\
           table.tBodies[0].appendChild(tr);\
           tr.querySelector(\"input\").focus();\
         }\
         function delRow(btn) {\
           btn.closest(\"tr\").remove();\
         }\
         </script>",
    );
    c.panel_end();
    c.done();
}
