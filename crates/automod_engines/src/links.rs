#![forbid(unsafe_code)]

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use automod_kernel_contracts::config::LinksRuleConfig;
use automod_kernel_contracts::violation::{LinkFinding, Violation, ViolationKind};

pub mod reason_codes {
    use automod_kernel_contracts::ReasonCodeId;

    // Links rule reason-code namespace.
    pub const AUTOMOD_LINKS_INVITE: ReasonCodeId = ReasonCodeId(0x414D_0301);
    pub const AUTOMOD_LINKS_NOT_WHITELISTED: ReasonCodeId = ReasonCodeId(0x414D_0302);
    pub const AUTOMOD_LINKS_BLOCKED: ReasonCodeId = ReasonCodeId(0x414D_0303);
}

fn invite_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(discord\.(gg|io|me|li)|discordapp\.com/invite|discord\.com/invite)/[a-zA-Z0-9]+",
        )
        .expect("invite pattern must compile")
    })
}

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"https?://\S+").expect("url pattern must compile"))
}

pub fn contains_invite(lowered: &str) -> bool {
    invite_pattern().is_match(lowered)
}

/// Punctuation that closes the surrounding sentence rather than the URL.
const URL_TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')', ']', '>', '\'', '"'];

pub fn extract_urls(lowered: &str) -> Vec<&str> {
    url_pattern()
        .find_iter(lowered)
        .map(|m| m.as_str().trim_end_matches(URL_TRAILING_PUNCTUATION))
        .collect()
}

/// Whitelist entries may be written as `example.com`, `*.example.com` or with a
/// trailing slash; all reduce to a bare host.
pub fn whitelist_host(entry: &str) -> String {
    let trimmed = entry.trim().to_lowercase();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(&trimmed);
    let without_wildcard = without_scheme.strip_prefix("*.").unwrap_or(without_scheme);
    without_wildcard
        .split('/')
        .next()
        .unwrap_or_default()
        .trim_end_matches('.')
        .to_string()
}

/// Host equals a whitelist entry or is a subdomain of one. Unparseable URLs never pass.
pub fn url_is_whitelisted(raw_url: &str, whitelist: &[String]) -> bool {
    let host = match Url::parse(raw_url).ok().and_then(|u| u.host_str().map(str::to_string)) {
        Some(h) => h,
        None => return false,
    };
    let host = host.trim_end_matches('.');
    whitelist.iter().map(|e| whitelist_host(e)).any(|allowed| {
        !allowed.is_empty()
            && (host == allowed
                || host
                    .strip_suffix(allowed.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.')))
    })
}

pub fn evaluate_links(content: &str, config: &LinksRuleConfig) -> Option<Violation> {
    if !config.enabled {
        return None;
    }
    let lowered = content.to_lowercase();

    let (finding, reason_code, reason) = if config.block_invites && contains_invite(&lowered) {
        (
            LinkFinding::Invite,
            reason_codes::AUTOMOD_LINKS_INVITE,
            "Discord invite link detected",
        )
    } else {
        let urls = extract_urls(&lowered);
        if urls.is_empty() {
            return None;
        }
        if config.whitelist.is_empty() {
            (
                LinkFinding::LinksBlocked,
                reason_codes::AUTOMOD_LINKS_BLOCKED,
                "Links are not allowed in this channel",
            )
        } else if urls.iter().all(|u| url_is_whitelisted(u, &config.whitelist)) {
            return None;
        } else {
            (
                LinkFinding::NotWhitelisted,
                reason_codes::AUTOMOD_LINKS_NOT_WHITELISTED,
                "Link not in whitelist",
            )
        }
    };

    Violation::v1(
        ViolationKind::Links,
        reason_code,
        reason.to_string(),
        config.action,
        None,
        Some(finding),
    )
    .map_err(|err| tracing::warn!(%err, "links violation failed contract validation"))
    .ok()
}
