//! Built-in component catalog registered into the global registry.

use crate::docs::{ComponentKind, ComponentSpec, FieldSpec, Registry, Status};

use serde_json::Value;

fn resource(kind: ComponentKind) -> ComponentSpec {
    ComponentSpec::new("resource", kind)
        .summary(format!("References a {} resource by its label.", kind))
        .config(FieldSpec::string("", "The label of the resource."))
}

fn omit_if_empty(v: &Value, _: &serde_json::Map<String, Value>) -> Option<String> {
    match v {
        Value::String(s) if s.is_empty() => Some("field is empty and can be removed".to_string()),
        Value::Array(a) if a.is_empty() => Some("field is empty and can be removed".to_string()),
        _ => None,
    }
}

fn tls() -> FieldSpec {
    FieldSpec::object(
        "tls",
        "Custom TLS settings.",
        vec![
            FieldSpec::bool("enabled", "Whether TLS is enabled."),
            FieldSpec::bool("skip_cert_verify", "Skip server certificate verification.").advanced(),
            FieldSpec::string("root_cas_file", "Path to a root CA bundle.").omit_when(omit_if_empty),
        ],
    )
    .advanced()
}

fn inputs() -> Vec<ComponentSpec> {
    let kind = ComponentKind::Input;
    vec![
        ComponentSpec::new("stdin", kind)
            .summary("Consumes data piped to stdin as line delimited messages.")
            .fields(vec![
                FieldSpec::string("codec", "How messages are split from the stream."),
                FieldSpec::int("max_buffer", "Maximum buffer size in bytes.").advanced(),
                FieldSpec::bool("multipart", "Treat blank lines as batch boundaries.").deprecated(),
            ]),
        ComponentSpec::new("file", kind)
            .summary("Consumes data from files on disk.")
            .fields(vec![
                FieldSpec::string("paths", "Paths to consume from.").array(),
                FieldSpec::string("codec", "How messages are split from the stream."),
                FieldSpec::bool("delete_on_finish", "Delete files once consumed.").advanced(),
            ]),
        ComponentSpec::new("http_server", kind)
            .summary("Receives messages POSTed over HTTP.")
            .status(Status::Beta)
            .fields(vec![
                FieldSpec::string("address", "Alternative listen address.").omit_when(omit_if_empty),
                FieldSpec::string("path", "Endpoint path."),
                FieldSpec::string("timeout", "Response timeout.").advanced(),
                tls(),
            ]),
        resource(kind),
    ]
}

fn buffers() -> Vec<ComponentSpec> {
    let kind = ComponentKind::Buffer;
    vec![
        ComponentSpec::new("memory", kind)
            .summary("Stores pending messages in memory.")
            .fields(vec![FieldSpec::int("limit", "Maximum buffer size in bytes.")]),
        ComponentSpec::new("none", kind).summary("No buffer."),
    ]
}

fn processors() -> Vec<ComponentSpec> {
    let kind = ComponentKind::Processor;
    vec![
        ComponentSpec::new("bloblang", kind)
            .summary("Executes a mapping on messages.")
            .config(FieldSpec::string("", "The mapping to execute.")),
        ComponentSpec::new("log", kind)
            .summary("Prints a log event for each message.")
            .fields(vec![
                FieldSpec::string("level", "The log level."),
                FieldSpec::string("message", "The message to print."),
                FieldSpec::string("fields", "Deprecated fields mapping.")
                    .map()
                    .deprecated(),
            ]),
        ComponentSpec::new("noop", kind).summary("Does nothing."),
        ComponentSpec::new("switch", kind)
            .summary("Runs processors conditionally.")
            .config(
                FieldSpec::object(
                    "",
                    "Cases to test in order.",
                    vec![
                        FieldSpec::string("check", "A query deciding whether the case runs.")
                            .omit_when(omit_if_empty),
                        FieldSpec::component("processors", "Processors for this case.", kind)
                            .array(),
                        FieldSpec::bool("fallthrough", "Continue to the next case.").advanced(),
                    ],
                )
                .array(),
            ),
        resource(kind),
    ]
}

fn outputs() -> Vec<ComponentSpec> {
    let kind = ComponentKind::Output;
    vec![
        ComponentSpec::new("stdout", kind)
            .summary("Prints messages to stdout.")
            .fields(vec![
                FieldSpec::string("codec", "How messages are written to the stream."),
                FieldSpec::string("delimiter", "Legacy message delimiter.").deprecated(),
            ]),
        ComponentSpec::new("file", kind)
            .summary("Writes messages to files on disk.")
            .fields(vec![
                FieldSpec::string("path", "Path of the file to write."),
                FieldSpec::string("codec", "How messages are written to the stream."),
            ]),
        ComponentSpec::new("drop", kind).summary("Drops all messages."),
        resource(kind),
    ]
}

fn caches() -> Vec<ComponentSpec> {
    let kind = ComponentKind::Cache;
    vec![
        ComponentSpec::new("memory", kind)
            .summary("Stores key/value pairs in a map held in memory.")
            .fields(vec![
                FieldSpec::string("ttl", "Default TTL of items."),
                FieldSpec::int("shards", "Number of map shards.").advanced(),
            ]),
        ComponentSpec::new("redis", kind)
            .summary("Uses a Redis instance as a cache.")
            .fields(vec![
                FieldSpec::string("url", "The URL of the target Redis server."),
                FieldSpec::string("prefix", "A key prefix.").omit_when(omit_if_empty),
                tls(),
            ]),
        resource(kind),
    ]
}

fn rate_limits() -> Vec<ComponentSpec> {
    vec![
        ComponentSpec::new("local", ComponentKind::RateLimit)
            .summary("Limits requests within a single process.")
            .fields(vec![
                FieldSpec::int("count", "Maximum requests per interval."),
                FieldSpec::string("interval", "The interval."),
            ]),
    ]
}

fn conditions() -> Vec<ComponentSpec> {
    let kind = ComponentKind::Condition;
    vec![
        ComponentSpec::new("static", kind)
            .summary("Always returns the same result.")
            .status(Status::Deprecated)
            .config(FieldSpec::bool("", "The static result.")),
        ComponentSpec::new("bloblang", kind)
            .summary("Checks a query against each message.")
            .status(Status::Deprecated)
            .config(FieldSpec::string("", "The query.")),
    ]
}

fn observability() -> Vec<ComponentSpec> {
    vec![
        ComponentSpec::new("prometheus", ComponentKind::Metrics)
            .summary("Hosts a Prometheus metrics endpoint.")
            .fields(vec![
                FieldSpec::string("prefix", "Metric name prefix."),
                FieldSpec::string("push_url", "Optional push gateway.").omit_when(omit_if_empty),
            ]),
        ComponentSpec::new("none", ComponentKind::Metrics).summary("Disables metrics."),
        ComponentSpec::new("jaeger", ComponentKind::Tracer)
            .summary("Sends spans to a Jaeger agent.")
            .fields(vec![
                FieldSpec::string("agent_address", "Address of the agent."),
                FieldSpec::string("service_name", "Service name."),
            ]),
        ComponentSpec::new("none", ComponentKind::Tracer).summary("Disables tracing."),
    ]
}

/// Register every built-in component.
pub fn register_builtins(registry: &Registry) {
    let all = [
        inputs(),
        buffers(),
        processors(),
        outputs(),
        caches(),
        rate_limits(),
        conditions(),
        observability(),
    ];
    for spec in all.into_iter().flatten() {
        registry.register(spec);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs::{Provider, SanitiseConfig, sanitise_component_config};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn builtins() -> Registry {
        let r = Registry::new();
        register_builtins(&r);
        r
    }

    #[test]
    fn every_builtin_declares_its_own_name_and_kind() {
        let r = builtins();
        for kind in ComponentKind::ALL {
            for spec in r.components(kind) {
                let found = r.get_docs(&spec.name, kind).unwrap();
                assert_eq!(found.name, spec.name);
                assert_eq!(found.kind, kind);
            }
        }
        assert!(!r.components(ComponentKind::Input).is_empty());
    }

    #[test]
    fn switch_cases_sanitise_nested_processors() {
        let conf = SanitiseConfig {
            docs_provider: Some(std::sync::Arc::new(builtins())),
            ..SanitiseConfig::default()
        };
        let mut v = json!({
            "switch": [
                {"check": "", "processors": [{"log": {"message": "hi"}, "noise": 1}]},
            ],
        });
        sanitise_component_config(ComponentKind::Processor, &mut v, &conf).unwrap();
        assert_eq!(
            v,
            json!({"switch": [{"processors": [{"log": {"message": "hi"}}]}]})
        );
    }
}
