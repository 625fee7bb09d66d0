//! Built-in framework entries.

use crate::entry::Entry;
use crate::value::Kind;

// Every built-in entry except `server.proxy.host` is required: the typed
// views in `schema` can't represent an unset value.

fn string(value: &str) -> Entry {
    Entry::new(Kind::String).with_value(value).required()
}

fn int(value: i64) -> Entry {
    Entry::new(Kind::Int).with_value(value).required()
}

fn boolean(value: bool) -> Entry {
    Entry::new(Kind::Bool).with_value(value).required()
}

pub(crate) fn entries() -> Vec<(&'static str, Entry)> {
    vec![
        ("app.name", string("goyave")),
        ("app.environment", string("localhost")),
        ("app.debug", boolean(true)),
        ("app.defaultLanguage", string("en-US")),
        ("server.host", string("127.0.0.1")),
        ("server.domain", string("")),
        ("server.port", int(8080)),
        ("server.writeTimeout", int(10)),
        ("server.readTimeout", int(10)),
        ("server.readHeaderTimeout", int(10)),
        ("server.idleTimeout", int(20)),
        ("server.websocketCloseTimeout", int(10)),
        ("server.maxUploadSize", Entry::new(Kind::Float).with_value(10.0).required()),
        (
            "server.proxy.protocol",
            string("http").authorized(["http", "https"]),
        ),
        ("server.proxy.host", Entry::new(Kind::String)),
        ("server.proxy.port", int(80)),
        ("server.proxy.base", string("")),
        ("database.connection", string("none")),
        ("database.host", string("127.0.0.1")),
        ("database.port", int(0)),
        ("database.name", string("")),
        ("database.username", string("")),
        ("database.password", string("")),
        ("database.options", string("")),
        ("database.maxOpenConnections", int(20)),
        ("database.maxIdleConnections", int(20)),
        ("database.maxLifetime", int(300)),
        ("database.defaultReadQueryTimeout", int(20_000)),
        ("database.defaultWriteQueryTimeout", int(40_000)),
        ("database.config.skipDefaultTransaction", boolean(false)),
        ("database.config.dryRun", boolean(false)),
        ("database.config.prepareStmt", boolean(true)),
        ("database.config.disableNestedTransaction", boolean(false)),
        ("database.config.allowGlobalUpdate", boolean(false)),
        ("database.config.disableAutomaticPing", boolean(false)),
        (
            "database.config.disableForeignKeyConstraintWhenMigrating",
            boolean(false),
        ),
    ]
}
