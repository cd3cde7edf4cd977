//! Plain-text projection of [`DashboardState`].

use std::fmt::Write;

use crate::controller::DashboardState;

const COLUMNS: [(&str, usize); 6] = [
    ("ID", 5),
    ("Name", 20),
    ("Email", 28),
    ("Company", 18),
    ("Address", 24),
    ("City", 14),
];

fn cell(out: &mut String, text: &str, width: usize) {
    let mut shown: String = text.chars().take(width).collect();
    if text.chars().count() > width && width > 1 {
        shown.pop();
        shown.push('~');
    }
    let _ = write!(out, "{shown:<width$}  ");
}

pub fn render(state: &DashboardState) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Total Users: {}", state.users.len());
    if !state.debounced_query.is_empty() {
        let _ = writeln!(out, "Search Results: \"{}\"", state.debounced_query);
    }
    if let Some(notice) = &state.notice {
        let _ = writeln!(out, "{notice}");
    }
    if let Some(err) = &state.load_error {
        let _ = writeln!(out, "Error: {err}");
    }

    if state.is_loading {
        out.push_str("Loading users...\n");
    } else if state.users.is_empty() {
        out.push_str("No users found\n");
    } else {
        for (title, width) in COLUMNS {
            cell(&mut out, title, width);
        }
        out.push('\n');
        for user in &state.users {
            let id = user.id.to_string();
            let values = [
                id.as_str(),
                user.name.as_str(),
                user.email.as_str(),
                user.company.as_str(),
                user.address.as_str(),
                user.city.as_str(),
            ];
            for (value, (_, width)) in values.into_iter().zip(COLUMNS) {
                cell(&mut out, value, width);
            }
            out.push('\n');
        }
    }

    if let Some(pending) = &state.pending_delete {
        let _ = writeln!(
            out,
            "\nDelete User: Are you sure you want to delete {}? This action cannot be undone.",
            pending.user.name
        );
        if let Some(err) = &pending.error {
            let _ = writeln!(out, "Error deleting user: {err}");
        }
        if pending.is_deleting {
            out.push_str("Deleting...\n");
        } else {
            out.push_str("[/confirm] Delete User   [/cancel] Cancel\n");
        }
    }

    out
}
