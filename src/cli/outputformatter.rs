use std::fmt::Write as _;

use terminal_size::{terminal_size, Width};

use crate::model::{BusSchedule, CanteenMenuItem, TimetableEntry, User};
use crate::present::ListView;
use crate::views::{AdminListing, BusGroups, CanteenGroups, NavItem, TimetableGroups, FEATURES};

const MAX_COL_WIDTH: usize = 60;
const MIN_COL_WIDTH: usize = 16;

/// Render rows as an ASCII table. Column widths follow content up to a cap derived from
/// the terminal width (`MAX_COL_WIDTH` when stdout is not a terminal); numeric cells are
/// right-aligned.
pub fn render_table(cols: &[&str], rows: &[Vec<String>]) -> String {
    render_table_capped(cols, rows, column_cap(terminal_width(), cols.len()))
}

fn render_table_capped(cols: &[&str], rows: &[Vec<String>], cap: usize) -> String {
    let widths = column_widths(cols, rows, cap);
    let rule = rule_line(&widths);
    let header: Vec<String> = cols.iter().map(|c| c.to_string()).collect();
    let mut out = String::new();
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "{}", row_line(&header, &widths, false));
    let _ = writeln!(out, "{}", rule);
    for r in rows {
        let _ = writeln!(out, "{}", row_line(r, &widths, true));
    }
    let _ = writeln!(out, "{}", rule);
    out
}

fn char_len(s: &str) -> usize { s.chars().count() }

fn terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

// each column costs its width plus "| " and " " of border
fn column_cap(term_width: Option<usize>, ncols: usize) -> usize {
    match term_width {
        Some(w) if ncols > 0 => (w.saturating_sub(1) / ncols).saturating_sub(3).clamp(MIN_COL_WIDTH, MAX_COL_WIDTH),
        _ => MAX_COL_WIDTH,
    }
}

fn column_widths(cols: &[&str], rows: &[Vec<String>], cap: usize) -> Vec<usize> {
    cols.iter()
        .enumerate()
        .map(|(i, c)| {
            rows.iter()
                .filter_map(|r| r.get(i))
                .map(|cell| char_len(cell))
                .fold(char_len(c), usize::max)
                .min(cap)
        })
        .collect()
}

fn rule_line(widths: &[usize]) -> String {
    widths.iter().fold(String::from("+"), |mut s, w| {
        s.push_str(&"-".repeat(w + 2));
        s.push('+');
        s
    })
}

fn row_line(cells: &[String], widths: &[usize], align_numbers: bool) -> String {
    let mut s = String::from("|");
    for (i, &w) in widths.iter().enumerate() {
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        let text = clip(cell, w);
        let _ = if align_numbers && looks_numeric(cell) {
            write!(s, " {:>w$} |", text, w = w)
        } else {
            write!(s, " {:<w$} |", text, w = w)
        };
    }
    s
}

fn clip(s: &str, max: usize) -> String {
    if char_len(s) <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

// ids and prices
fn looks_numeric(s: &str) -> bool {
    let t = s.trim();
    t.chars().any(|c| c.is_ascii_digit()) && t.chars().all(|c| c.is_ascii_digit() || ".,-+".contains(c))
}

pub fn format_price(p: f64) -> String { format!("{:.2}", p) }

/// Shared wrapper for the non-ready states of any list page.
fn render_list_view<T>(title: &str, view: &ListView<T>, ready: impl FnOnce(&T) -> String) -> String {
    let mut out = format!("== {} ==\n", title);
    match view {
        ListView::Loading => out.push_str("loading...\n"),
        ListView::Failed(msg) => { let _ = writeln!(out, "error: {}", msg); }
        ListView::Empty(n) => { let _ = writeln!(out, "{}\n{}", n.title, n.detail); }
        ListView::Ready(v) => out.push_str(&ready(v)),
    }
    out
}

fn timetable_rows(entries: &[TimetableEntry]) -> Vec<Vec<String>> {
    entries.iter().map(|e| vec![e.time.clone(), e.subject.clone(), format!("Room {}", e.room)]).collect()
}

fn bus_rows(entries: &[BusSchedule]) -> Vec<Vec<String>> {
    entries.iter().map(|b| vec![b.time.clone(), b.bus_no.clone()]).collect()
}

fn menu_rows(items: &[CanteenMenuItem]) -> Vec<Vec<String>> {
    items.iter().map(|i| vec![i.item.clone(), format_price(i.price)]).collect()
}

pub fn render_timetable(view: &ListView<TimetableGroups>) -> String {
    render_list_view("Class Timetable", view, |groups| {
        let mut out = String::new();
        for (day, entries) in groups.iter() {
            let _ = writeln!(out, "\n{}", day);
            out.push_str(&render_table(&["Time", "Subject", "Room"], &timetable_rows(entries)));
        }
        out
    })
}

pub fn render_bus(view: &ListView<BusGroups>) -> String {
    render_list_view("Bus Schedule", view, |groups| {
        let mut out = String::new();
        for (route, entries) in groups.iter() {
            let _ = writeln!(out, "\n{}", route);
            out.push_str(&render_table(&["Time", "Bus Number"], &bus_rows(entries)));
        }
        out
    })
}

pub fn render_canteen(view: &ListView<CanteenGroups>) -> String {
    render_list_view("Canteen Menu", view, |days| {
        let mut out = String::new();
        for (day, cats) in days.iter() {
            let _ = writeln!(out, "\n{}", day);
            for (cat, items) in cats.iter() {
                let _ = writeln!(out, "[{}]", cat);
                out.push_str(&render_table(&["Item", "Price"], &menu_rows(items)));
            }
        }
        out
    })
}

pub fn render_admin_listing(listing: &AdminListing) -> String {
    if listing.is_empty() {
        return "no entries\n".to_string();
    }
    match listing {
        AdminListing::Timetable(v) => {
            let rows: Vec<Vec<String>> = v.iter().map(|e| vec![e.id.to_string(), e.day.to_string(), e.time.clone(), e.subject.clone(), e.room.clone()]).collect();
            render_table(&["Id", "Day", "Time", "Subject", "Room"], &rows)
        }
        AdminListing::Bus(v) => {
            let rows: Vec<Vec<String>> = v.iter().map(|b| vec![b.id.to_string(), b.route.clone(), b.time.clone(), b.bus_no.clone()]).collect();
            render_table(&["Id", "Route", "Time", "Bus Number"], &rows)
        }
        AdminListing::Canteen(v) => {
            let rows: Vec<Vec<String>> = v.iter().map(|i| vec![i.id.to_string(), i.day.to_string(), i.category.to_string(), i.item.clone(), format_price(i.price)]).collect();
            render_table(&["Id", "Day", "Category", "Item", "Price"], &rows)
        }
    }
}

pub fn render_user(u: &User) -> String {
    let role = if u.is_admin { "admin" } else { "student" };
    let rows = vec![vec![u.id.to_string(), u.username.clone(), u.email.clone(), role.to_string(), u.is_active.to_string()]];
    render_table(&["Id", "Username", "Email", "Role", "Active"], &rows)
}

pub fn render_menu(items: &[NavItem]) -> String {
    let mut out = String::from("Campus Portal\n");
    for f in FEATURES.iter() {
        let _ = writeln!(out, "  {:<16} {}  ({})", f.title, f.description, f.command);
    }
    out.push_str("Navigate: ");
    out.push_str(&items.iter().map(|n| format!("{} ({})", n.label, n.command)).collect::<Vec<_>>().join(" | "));
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Weekday;
    use crate::present::{group_timetable, EmptyNotice};

    #[test]
    fn table_aligns_numbers_right() {
        let t = render_table_capped(&["Item", "Price"], &[vec!["Tea".into(), "5.00".into()], vec!["Masala Dosa".into(), "45.50".into()]], MAX_COL_WIDTH);
        let lines: Vec<&str> = t.lines().collect();
        assert_eq!(lines[0], "+-------------+-------+");
        assert_eq!(lines[3], "| Tea         |  5.00 |");
    }

    #[test]
    fn narrow_terminal_shrinks_columns() {
        assert_eq!(column_cap(None, 3), MAX_COL_WIDTH);
        assert_eq!(column_cap(Some(400), 2), MAX_COL_WIDTH);
        assert_eq!(column_cap(Some(81), 4), 17);
        assert_eq!(column_cap(Some(20), 5), MIN_COL_WIDTH);

        let long = "x".repeat(30);
        let t = render_table_capped(&["Subject"], &[vec![long]], 17);
        let lines: Vec<&str> = t.lines().collect();
        assert_eq!(lines[0], format!("+{}+", "-".repeat(19)));
        assert_eq!(lines[3], format!("| {}… |", "x".repeat(16)));
    }

    #[test]
    fn long_cells_are_clipped() {
        assert_eq!(clip("abcdef", 4), "abc…");
        assert_eq!(clip("abc", 4), "abc");
        assert!(!looks_numeric("Room 4"));
        assert!(looks_numeric("1,250.00"));
    }

    #[test]
    fn empty_state_prints_notice_not_loading() {
        let v: ListView<TimetableGroups> = ListView::Empty(EmptyNotice::new("No classes scheduled", "There are no classes scheduled for Monday."));
        let s = render_timetable(&v);
        assert!(s.contains("There are no classes scheduled for Monday."));
        assert!(!s.contains("loading"));
    }

    #[test]
    fn ready_timetable_lists_days_in_group_order() {
        let entries = vec![
            TimetableEntry { id: 1, day: Weekday::Tuesday, time: "10:00".into(), subject: "Physics".into(), room: "B2".into(), created_at: String::new() },
            TimetableEntry { id: 2, day: Weekday::Monday, time: "08:00".into(), subject: "Maths".into(), room: "A1".into(), created_at: String::new() },
        ];
        let s = render_timetable(&ListView::Ready(group_timetable(entries)));
        let tue = s.find("Tuesday").unwrap();
        let mon = s.find("Monday").unwrap();
        assert!(tue < mon);
        assert!(s.contains("Room A1"));
    }
}
