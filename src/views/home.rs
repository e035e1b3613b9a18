use crate::session::AuthState;

/// One navigation entry; `command` is what the CLI accepts for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub label: &'static str,
    pub command: &'static str,
}

const fn nav(label: &'static str, command: &'static str) -> NavItem { NavItem { label, command } }

pub const PAGES: [NavItem; 4] = [
    nav("Home", "menu"),
    nav("Timetable", "timetable"),
    nav("Bus Schedule", "bus"),
    nav("Canteen Menu", "canteen"),
];

/// Menu for the current session: pages, Admin for admins, then account actions.
pub fn nav_items(state: &AuthState) -> Vec<NavItem> {
    let mut items = PAGES.to_vec();
    if state.is_admin() {
        items.push(nav("Admin", "admin"));
    }
    if state.is_authenticated() {
        items.push(nav("Logout", "logout"));
    } else if !state.is_loading() {
        items.push(nav("Login", "login"));
        items.push(nav("Register", "register"));
    }
    items
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feature {
    pub title: &'static str,
    pub description: &'static str,
    pub command: &'static str,
}

pub const FEATURES: [Feature; 3] = [
    Feature { title: "Class Timetable", description: "View your daily class schedule with room details and timings", command: "timetable" },
    Feature { title: "Bus Schedule", description: "Check bus timings and routes for easy campus commute", command: "bus" },
    Feature { title: "Canteen Menu", description: "Explore daily menu items with prices and categories", command: "canteen" },
];
