#![forbid(unsafe_code)]

use automod_kernel_contracts::{ActorId, ChannelId, RoleId, UnixTimeMs};
use automod_os::admin::{AutomodAdmin, RuleUpdate};
use automod_storage::document::DocumentStore;
use automod_storage::documents::{ConfigDocument, StrikeDocument};

pub const USAGE: &str = "usage: automod <status|strikes <actor>|clear <actor>|clear-all|enable|disable|badword <add|remove> <word>|whitelist <add|remove> <domain>|immune <add|remove> <role>|logchannel <channel|none>>";

pub fn execute_admin_command<C, S>(
    admin: &mut AutomodAdmin<C, S>,
    args: &[&str],
    now: UnixTimeMs,
) -> Result<String, String>
where
    C: DocumentStore<ConfigDocument>,
    S: DocumentStore<StrikeDocument>,
{
    let (command, rest) = args.split_first().ok_or_else(|| USAGE.to_string())?;
    match *command {
        "status" => Ok(admin.status().to_string()),
        "strikes" => {
            let actor = parse_actor(rest.first().copied())?;
            let record = admin.strikes(&actor, now);
            let mut out = format!("{actor}: {} active strike(s)", record.strikes);
            for entry in &record.violations {
                out.push_str(&format!("\n  {} {}", entry.timestamp_ms.0, entry.reason));
            }
            Ok(out)
        }
        "clear" => {
            let actor = parse_actor(rest.first().copied())?;
            if admin.clear_strikes(&actor) {
                Ok(format!("cleared strikes for {actor}"))
            } else {
                Ok(format!("{actor} has no strikes"))
            }
        }
        "clear-all" => {
            let removed = admin.clear_all_strikes();
            Ok(format!("cleared strikes for {removed} actor(s)"))
        }
        "enable" => configure(admin, RuleUpdate::SetEnabled(true), "automod enabled"),
        "disable" => configure(admin, RuleUpdate::SetEnabled(false), "automod disabled"),
        "badword" => {
            let (op, word) = list_args(rest)?;
            let update = if op == ListOp::Add {
                RuleUpdate::AddBadword(word)
            } else {
                RuleUpdate::RemoveBadword(word)
            };
            let done = configure(admin, update, "OK")?;
            Ok(format!(
                "{done} ({} words)",
                admin.config().badwords.words.len()
            ))
        }
        "whitelist" => {
            let (op, domain) = list_args(rest)?;
            let update = if op == ListOp::Add {
                RuleUpdate::AddWhitelistDomain(domain)
            } else {
                RuleUpdate::RemoveWhitelistDomain(domain)
            };
            let done = configure(admin, update, "OK")?;
            Ok(format!(
                "{done} ({} domains)",
                admin.config().links.whitelist.len()
            ))
        }
        "immune" => {
            let (op, raw) = list_args(rest)?;
            let role = RoleId::new(raw).map_err(|e| format!("invalid role id: {e}"))?;
            let update = if op == ListOp::Add {
                RuleUpdate::AddImmuneRole(role)
            } else {
                RuleUpdate::RemoveImmuneRole(role)
            };
            configure(admin, update, "OK")
        }
        "logchannel" => {
            let raw = rest.first().copied().ok_or_else(|| USAGE.to_string())?;
            let channel = if raw == "none" {
                None
            } else {
                Some(ChannelId::new(raw).map_err(|e| format!("invalid channel id: {e}"))?)
            };
            configure(admin, RuleUpdate::SetLogChannel(channel), "OK")
        }
        other => Err(format!("unknown automod command: {other}\n{USAGE}")),
    }
}

fn configure<C, S>(
    admin: &mut AutomodAdmin<C, S>,
    update: RuleUpdate,
    done: &str,
) -> Result<String, String>
where
    C: DocumentStore<ConfigDocument>,
    S: DocumentStore<StrikeDocument>,
{
    match admin.configure(update) {
        Ok(true) => Ok(done.to_string()),
        Ok(false) => Ok(format!("{done} (unchanged)")),
        Err(err) => Err(err.to_string()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListOp {
    Add,
    Remove,
}

/// `add|remove <value...>`; multi-word values (`wall hack`) are rejoined.
fn list_args(rest: &[&str]) -> Result<(ListOp, String), String> {
    let op = match rest.first().copied() {
        Some("add") => ListOp::Add,
        Some("remove") => ListOp::Remove,
        _ => return Err(USAGE.to_string()),
    };
    if rest.len() < 2 {
        return Err(USAGE.to_string());
    }
    Ok((op, rest[1..].join(" ")))
}

fn parse_actor(raw: Option<&str>) -> Result<ActorId, String> {
    let raw = raw.ok_or_else(|| "missing actor id".to_string())?;
    ActorId::new(raw).map_err(|e| format!("invalid actor id: {e}"))
}
