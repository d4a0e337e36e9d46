//! Output formatting for the chatcache CLI
//!
//! Tables via comfy-table for humans, pretty JSON for scripts.

use chatcache_core::{CacheStats, ChatRef, Message};
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};
use std::sync::Arc;

// ============================================================================
// Formatters
// ============================================================================

fn header(table: &mut Table, columns: &[&str], no_color: bool) {
    if no_color {
        table.set_header(columns.to_vec());
    } else {
        table.set_header(
            columns
                .iter()
                .map(|c| Cell::new(c).fg(Color::Cyan))
                .collect::<Vec<_>>(),
        );
    }
}

/// Format messages as table (human) or JSON
pub fn format_message_table(messages: &[Arc<Message>], json: bool, no_color: bool) -> String {
    if json {
        return serde_json::to_string_pretty(messages).unwrap_or_else(|_| "[]".to_string());
    }

    if messages.is_empty() {
        return "No messages.".to_string();
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    header(&mut table, &["ID", "Sender", "Sent", "Content"], no_color);

    for message in messages {
        let sent = message.created_at().format("%Y-%m-%d %H:%M:%S").to_string();
        table.add_row(Row::from(vec![
            message.id().to_string(),
            message.sender_id().to_string(),
            sent,
            truncate(message.content(), 60),
        ]));
    }

    table.to_string()
}

/// Format a user's chats as table (human) or JSON
pub fn format_chat_table(chats: &[ChatRef], json: bool, no_color: bool) -> String {
    if json {
        let snapshots: Vec<_> = chats.iter().map(ChatRef::snapshot).collect();
        return serde_json::to_string_pretty(&snapshots).unwrap_or_else(|_| "[]".to_string());
    }

    if chats.is_empty() {
        return "No chats.".to_string();
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    header(&mut table, &["Chat", "Participants", "Msgs", "Pinned"], no_color);

    for chat in chats {
        let participants = chat
            .participants()
            .iter()
            .map(|u| u.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(Row::from(vec![
            chat.id().to_string(),
            participants,
            chat.message_count().to_string(),
            chat.pinned().len().to_string(),
        ]));
    }

    table.to_string()
}

/// Format cache counters (human or JSON)
pub fn format_cache_stats(stats: &CacheStats, json: bool) -> String {
    if json {
        return serde_json::to_string_pretty(stats).unwrap_or_else(|_| "{}".to_string());
    }

    let lines = [
        format!("Cache hits:       {}", stats.hits),
        format!("Cache misses:     {}", stats.misses),
        format!("Hit ratio:        {:.0}%", stats.hit_ratio() * 100.0),
        format!("Invalidations:    {}", stats.invalidations),
        format!("Cached users:     {}", stats.cached_users),
        format!("Cached chats:     {}", stats.cached_chats),
    ];
    lines.join("\n")
}

// ============================================================================
// Helpers
// ============================================================================

/// Truncate on a char boundary, appending an ellipsis when cut
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let cut: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", cut)
}
