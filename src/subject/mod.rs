//! Pure bus subject computation. No I/O; every function here is total.

use std::fmt;

/// The three RPC verbs dispatched broadcast-style across all three scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Data,
    Command,
    Create,
}

impl Verb {
    pub const ALL: [Verb; 4] = [Verb::Get, Verb::Data, Verb::Command, Verb::Create];
    /// The three verbs subscribed broadcast-style (as opposed to `Create`'s queue group).
    pub const BROADCAST: [Verb; 3] = [Verb::Get, Verb::Data, Verb::Command];

    fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "get",
            Verb::Data => "data",
            Verb::Command => "command",
            Verb::Create => "create",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three matching scopes a request subject is subscribed under for each verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Cluster,
    Application,
    Node,
}

pub const ALL_SCOPES: [Scope; 3] = [Scope::Cluster, Scope::Application, Scope::Node];

/// `P + "ping"`.
pub fn ping_subject(prefix: &str) -> String {
    format!("{prefix}ping")
}

/// `P + "announce"`.
pub fn announce_subject(prefix: &str) -> String {
    format!("{prefix}announce")
}

/// `P + verb + "." + app + "." + node`, with `app`/`node` empty per `scope`.
pub fn request_subject(prefix: &str, verb: Verb, scope: Scope, application: &str, node: &str) -> String {
    let (app, node) = match scope {
        Scope::Cluster => ("", ""),
        Scope::Application => (application, ""),
        Scope::Node => (application, node),
    };
    format!("{prefix}{verb}.{app}.{node}")
}

/// `P + "event." + app + "." + node`.
pub fn canonical_event_subject(prefix: &str, application: &str, node: &str) -> String {
    format!("{prefix}event.{application}.{node}")
}

/// `P + "dialogevent." + dialogId`.
pub fn dialog_event_subject(prefix: &str, dialog_id: &str) -> String {
    format!("{prefix}dialogevent.{dialog_id}")
}

/// Every subject the supervisor subscribes to at boot, paired with whether it takes the
/// `create` queue group. Order matches the boot sequence in the supervisor's design: ping
/// first, then the three broadcast verbs across all scopes, then `create`.
pub fn boot_subjects(prefix: &str, application: &str, node: &str) -> Vec<(String, Option<&'static str>)> {
    let mut subjects = vec![(ping_subject(prefix), None)];
    for verb in Verb::BROADCAST {
        for scope in ALL_SCOPES {
            subjects.push((request_subject(prefix, verb, scope, application, node), None));
        }
    }
    for scope in ALL_SCOPES {
        subjects.push((request_subject(prefix, Verb::Create, scope, application, node), Some("ariproxy")));
    }
    subjects
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping_and_announce_subjects_use_the_prefix() {
        assert_eq!(ping_subject("ari."), "ari.ping");
        assert_eq!(announce_subject("ari."), "ari.announce");
    }

    #[test]
    fn request_subject_encodes_each_scope() {
        assert_eq!(request_subject("ari.", Verb::Get, Scope::Cluster, "demo", "node-A"), "ari.get..");
        assert_eq!(request_subject("ari.", Verb::Get, Scope::Application, "demo", "node-A"), "ari.get.demo.");
        assert_eq!(request_subject("ari.", Verb::Get, Scope::Node, "demo", "node-A"), "ari.get.demo.node-A");
    }

    #[test]
    fn canonical_and_dialog_event_subjects() {
        assert_eq!(canonical_event_subject("ari.", "demo", "node-A"), "ari.event.demo.node-A");
        assert_eq!(dialog_event_subject("ari.", "d1"), "ari.dialogevent.d1");
    }

    #[test]
    fn boot_subjects_covers_s1_scenario() {
        let subjects: Vec<String> =
            boot_subjects("ari.", "demo", "node-A").into_iter().map(|(s, _)| s).collect();
        for expected in [
            "ari.ping",
            "ari.get..",
            "ari.get.demo.",
            "ari.get.demo.node-A",
            "ari.data..",
            "ari.data.demo.",
            "ari.data.demo.node-A",
            "ari.command..",
            "ari.command.demo.",
            "ari.command.demo.node-A",
            "ari.create..",
            "ari.create.demo.",
            "ari.create.demo.node-A",
        ] {
            assert!(subjects.contains(&expected.to_string()), "missing {expected}");
        }
        assert_eq!(subjects.len(), 13);
    }

    #[test]
    fn only_create_subjects_carry_a_queue_group() {
        let subjects = boot_subjects("ari.", "demo", "node-A");
        let create_count = subjects.iter().filter(|(_, q)| q.is_some()).count();
        assert_eq!(create_count, 3);
        for (subject, queue) in &subjects {
            if queue.is_some() {
                assert!(subject.starts_with("ari.create."));
            }
        }
    }

    #[test]
    fn request_subject_round_trips_through_parsing() {
        for verb in Verb::ALL {
            for scope in ALL_SCOPES {
                let subject = request_subject("ari.", verb, scope, "demo", "node-A");
                let parts: Vec<&str> = subject.strip_prefix("ari.").unwrap().split('.').collect();
                assert_eq!(parts[0], verb.to_string());
                match scope {
                    Scope::Cluster => assert_eq!((parts[1], parts[2]), ("", "")),
                    Scope::Application => assert_eq!((parts[1], parts[2]), ("demo", "")),
                    Scope::Node => assert_eq!((parts[1], parts[2]), ("demo", "node-A")),
                }
            }
        }
    }
}
