use {
    switchboard_common::types::Peer, switchboard_config::SwitchboardConfig, tracing::debug,
};

/// Resolve which agent handles a message. First matching binding wins;
/// no match (or a misconfigured binding) falls back to the default agent.
#[must_use]
pub fn resolve_agent_id<'a>(
    cfg: &'a SwitchboardConfig,
    provider: &str,
    peer: &Peer,
    team_id: Option<&str>,
) -> &'a str {
    for binding in &cfg.bindings {
        let rule = &binding.rule;
        if rule.provider != provider {
            continue;
        }
        if let Some(peer_match) = &rule.peer
            && !peer_match.matches(peer)
        {
            continue;
        }
        if let Some(team) = &rule.team_id
            && team_id != Some(team.as_str())
        {
            continue;
        }
        debug!(agent_id = %binding.agent_id, provider, peer_id = %peer.id, "binding matched");
        return &binding.agent_id;
    }
    cfg.default_agent_id()
}
