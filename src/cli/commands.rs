//! Command interpreter shared by one-shot invocations and the REPL.

use std::collections::HashMap;

use crate::error::{PortalError, PortalResult};
use crate::model::{
    BusScheduleCreate, BusScheduleUpdate, CanteenMenuCreate, CanteenMenuUpdate, EntryId, LoginRequest, MenuCategory,
    RegisterRequest, TimetableCreate, TimetableUpdate, Weekday,
};
use crate::portal::Portal;
use crate::present::ListView;
use crate::session::{Access, AuthState};
use crate::views::{nav_items, AdminTab, AdminView, BusView, CanteenView, TimetableView};

use super::outputformatter::{render_admin_listing, render_bus, render_canteen, render_menu, render_table, render_timetable, render_user};

pub const COMMAND_HELP: &str = "Commands:
  login <username> <password>             sign in (session kept for 1 day)
  register <username> <email> <password>   create an account
  logout                                   discard the stored session
  whoami                                   show the signed-in user
  timetable [day|all]                      class timetable (default: today)
  bus [search]                             bus schedules, filtered by route substring
  canteen [day|all] [category]             canteen menu (default: today, all categories)
  admin [timetable|bus|canteen]            list entries (admins only)
  admin <tab> add key=value ...            create an entry
  admin <tab> update <id> key=value ...    change fields of an entry
  admin <tab> delete <id>                  remove an entry
  menu                                     home page and navigation
  status                                   API and session state
  help                                     show this help
  quit | exit                              leave the interpreter

Fields: timetable day,time,subject,room | bus route,time,bus_no | canteen day,item,price,category
Values with spaces can be quoted: subject=\"Data Structures\"";

/// Day selector: omitted means today, `all` means no day filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayArg {
    Today,
    All,
    Day(Weekday),
}

impl DayArg {
    pub fn resolve(self) -> Option<Weekday> {
        match self {
            DayArg::Today => Some(Weekday::today()),
            DayArg::All => None,
            DayArg::Day(d) => Some(d),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdminCommand {
    List(AdminTab),
    Add(AdminTab, Vec<(String, String)>),
    Update(AdminTab, EntryId, Vec<(String, String)>),
    Delete(AdminTab, EntryId),
}

impl AdminCommand {
    /// Tab whose data this command changes on the backend; `None` for listings.
    pub fn mutated_tab(&self) -> Option<AdminTab> {
        match self {
            AdminCommand::List(_) => None,
            AdminCommand::Add(tab, _) | AdminCommand::Update(tab, _, _) | AdminCommand::Delete(tab, _) => Some(*tab),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Login { username: String, password: String },
    Register { username: String, email: String, password: String },
    Logout,
    WhoAmI,
    Timetable(DayArg),
    Bus(String),
    Canteen { day: DayArg, category: Option<String> },
    Admin(AdminCommand),
    Menu,
    Status,
    Help,
    Quit,
}

/// Split on whitespace, keeping double-quoted runs together (quotes removed).
pub fn split_args(line: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut in_quotes = false;
    let mut has_token = false;
    for ch in line.chars() {
        match ch {
            '"' => { in_quotes = !in_quotes; has_token = true; }
            c if c.is_whitespace() && !in_quotes => {
                if has_token { out.push(std::mem::take(&mut cur)); has_token = false; }
            }
            c => { cur.push(c); has_token = true; }
        }
    }
    if has_token { out.push(cur); }
    out
}

fn parse_day_arg(s: &str) -> Result<DayArg, String> {
    match s.to_ascii_lowercase().as_str() {
        "all" => Ok(DayArg::All),
        "today" => Ok(DayArg::Today),
        _ => s.parse::<Weekday>().map(DayArg::Day).map_err(|e| e.message().to_string()),
    }
}

fn parse_id(s: &str) -> Result<EntryId, String> { s.parse::<EntryId>().map_err(|_| format!("invalid id '{}'", s)) }

fn parse_fields(args: &[String]) -> Result<Vec<(String, String)>, String> {
    args.iter()
        .map(|a| match a.split_once('=') {
            Some((k, v)) if !k.is_empty() => Ok((k.to_ascii_lowercase(), v.to_string())),
            _ => Err(format!("expected key=value, got '{}'", a)),
        })
        .collect()
}

/// Parse one input line. `Err` carries a usage message.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let args = split_args(line);
    let Some(head) = args.first() else { return Err("empty command".to_string()) };
    let rest = &args[1..];
    match head.to_ascii_lowercase().as_str() {
        "login" => match rest {
            [u, p] => Ok(Command::Login { username: u.clone(), password: p.clone() }),
            _ => Err("usage: login <username> <password>".to_string()),
        },
        "register" => match rest {
            [u, e, p] => Ok(Command::Register { username: u.clone(), email: e.clone(), password: p.clone() }),
            _ => Err("usage: register <username> <email> <password>".to_string()),
        },
        "logout" => Ok(Command::Logout),
        "whoami" | "me" => Ok(Command::WhoAmI),
        "timetable" => match rest {
            [] => Ok(Command::Timetable(DayArg::Today)),
            [d] => parse_day_arg(d).map(Command::Timetable),
            _ => Err("usage: timetable [day|all]".to_string()),
        },
        "bus" => Ok(Command::Bus(rest.join(" "))),
        "canteen" => match rest {
            [] => Ok(Command::Canteen { day: DayArg::Today, category: None }),
            [d] => Ok(Command::Canteen { day: parse_day_arg(d)?, category: None }),
            [d, c] => Ok(Command::Canteen { day: parse_day_arg(d)?, category: Some(c.clone()) }),
            _ => Err("usage: canteen [day|all] [category]".to_string()),
        },
        "admin" => parse_admin(rest).map(Command::Admin),
        "menu" | "home" => Ok(Command::Menu),
        "status" => Ok(Command::Status),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command '{}'; type 'help'", other)),
    }
}

fn parse_admin(rest: &[String]) -> Result<AdminCommand, String> {
    let tab = |s: &String| s.parse::<AdminTab>().map_err(|e| e.message().to_string());
    match rest {
        [] => Ok(AdminCommand::List(AdminTab::Timetable)),
        [t] => Ok(AdminCommand::List(tab(t)?)),
        [t, verb, tail @ ..] => match verb.to_ascii_lowercase().as_str() {
            "add" => Ok(AdminCommand::Add(tab(t)?, parse_fields(tail)?)),
            "update" => match tail {
                [id, fields @ ..] if !fields.is_empty() => Ok(AdminCommand::Update(tab(t)?, parse_id(id)?, parse_fields(fields)?)),
                _ => Err("usage: admin <tab> update <id> key=value ...".to_string()),
            },
            "delete" => match tail {
                [id] => Ok(AdminCommand::Delete(tab(t)?, parse_id(id)?)),
                _ => Err("usage: admin <tab> delete <id>".to_string()),
            },
            other => Err(format!("unknown admin action '{}'", other)),
        },
    }
}

// ---- payload builders ----

struct Fields(HashMap<String, String>);

impl Fields {
    fn new(pairs: &[(String, String)], allowed: &[&str]) -> PortalResult<Self> {
        for (k, _) in pairs {
            if !allowed.contains(&k.as_str()) {
                return Err(PortalError::validation(0, format!("unknown field '{}' (expected one of: {})", k, allowed.join(", "))));
            }
        }
        Ok(Self(pairs.iter().cloned().collect()))
    }

    fn opt(&self, k: &str) -> Option<String> { self.0.get(k).cloned() }

    fn req(&self, k: &str) -> PortalResult<String> {
        self.opt(k).filter(|v| !v.trim().is_empty()).ok_or_else(|| PortalError::validation(0, format!("missing field '{}'", k)))
    }

    fn day(&self) -> PortalResult<Option<Weekday>> { self.opt("day").map(|d| d.parse::<Weekday>()).transpose() }

    fn price(&self) -> PortalResult<Option<f64>> {
        self.opt("price")
            .map(|p| p.trim().parse::<f64>().map_err(|_| PortalError::validation(0, format!("invalid price '{}'", p))))
            .transpose()
    }
}

const TIMETABLE_FIELDS: [&str; 4] = ["day", "time", "subject", "room"];
const BUS_FIELDS: [&str; 3] = ["route", "time", "bus_no"];
const CANTEEN_FIELDS: [&str; 4] = ["day", "item", "price", "category"];

pub fn timetable_create(pairs: &[(String, String)]) -> PortalResult<TimetableCreate> {
    let f = Fields::new(pairs, &TIMETABLE_FIELDS)?;
    Ok(TimetableCreate { day: f.req("day")?.parse()?, time: f.req("time")?, subject: f.req("subject")?, room: f.req("room")? })
}

pub fn timetable_update(pairs: &[(String, String)]) -> PortalResult<TimetableUpdate> {
    let f = Fields::new(pairs, &TIMETABLE_FIELDS)?;
    Ok(TimetableUpdate { day: f.day()?, time: f.opt("time"), subject: f.opt("subject"), room: f.opt("room") })
}

pub fn bus_create(pairs: &[(String, String)]) -> PortalResult<BusScheduleCreate> {
    let f = Fields::new(pairs, &BUS_FIELDS)?;
    Ok(BusScheduleCreate { route: f.req("route")?, time: f.req("time")?, bus_no: f.req("bus_no")? })
}

pub fn bus_update(pairs: &[(String, String)]) -> PortalResult<BusScheduleUpdate> {
    let f = Fields::new(pairs, &BUS_FIELDS)?;
    Ok(BusScheduleUpdate { route: f.opt("route"), time: f.opt("time"), bus_no: f.opt("bus_no") })
}

pub fn canteen_create(pairs: &[(String, String)]) -> PortalResult<CanteenMenuCreate> {
    let f = Fields::new(pairs, &CANTEEN_FIELDS)?;
    let price = f.price()?.ok_or_else(|| PortalError::validation(0, "missing field 'price'"))?;
    let category = MenuCategory::from(f.opt("category").unwrap_or_default());
    CanteenMenuCreate::new(f.req("day")?.parse()?, f.req("item")?, price, category)
}

pub fn canteen_update(pairs: &[(String, String)]) -> PortalResult<CanteenMenuUpdate> {
    let f = Fields::new(pairs, &CANTEEN_FIELDS)?;
    Ok(CanteenMenuUpdate { day: f.day()?, item: f.opt("item"), price: f.price()?, category: f.opt("category").map(MenuCategory::from) })
}

// ---- execution ----

/// Interpreter state: the portal plus page views that live for the whole session,
/// so a bus search can re-filter without refetching.
pub struct Shell {
    portal: Portal,
    timetable: TimetableView,
    bus: BusView,
    canteen: CanteenView,
    admin: AdminView,
    bus_loaded: bool,
}

impl Shell {
    pub fn new(portal: Portal) -> Self {
        Self {
            timetable: portal.timetable_view(),
            bus: portal.bus_view(),
            canteen: portal.canteen_view(),
            admin: portal.admin_view(),
            portal,
            bus_loaded: false,
        }
    }

    pub fn portal(&self) -> &Portal { &self.portal }

    /// Rehydrate the session from the store.
    pub async fn start(&self) -> AuthState { self.portal.session.initialize().await }

    /// Run one command and return its text output. `Quit` is left to the caller.
    pub async fn execute(&mut self, cmd: Command) -> PortalResult<String> {
        match cmd {
            Command::Login { username, password } => {
                let req = LoginRequest { username, password };
                let st = self.portal.session.login_with_password(&self.portal.auth, &req).await?;
                match st.user() {
                    Some(u) => Ok(format!("logged in as {}{}\n", u.username, if u.is_admin { " (admin)" } else { "" })),
                    None => Err(PortalError::unauthorized("login succeeded but the user profile could not be loaded")),
                }
            }
            Command::Register { username, email, password } => {
                let user = self.portal.auth.register(&RegisterRequest { username, email, password }).await?;
                Ok(format!("registered {}; run 'login {} <password>' to sign in\n", user.username, user.username))
            }
            Command::Logout => {
                self.portal.session.logout();
                Ok("logged out\n".to_string())
            }
            Command::WhoAmI => match self.portal.session.current_user() {
                Some(u) => Ok(render_user(&u)),
                None => Err(PortalError::unauthorized("not logged in")),
            },
            Command::Timetable(day) => Ok(render_timetable(&self.timetable.select_day(day.resolve()).await)),
            Command::Bus(search) => {
                if !self.bus_loaded {
                    self.bus.set_search(&search);
                    let fetched = self.bus.refresh().await;
                    // a failed fetch is retried on the next `bus`
                    self.bus_loaded = matches!(fetched, ListView::Ready(_) | ListView::Empty(_));
                }
                Ok(render_bus(&self.bus.set_search(&search)))
            }
            Command::Canteen { day, category } => {
                Ok(render_canteen(&self.canteen.select(day.resolve(), category.as_deref()).await))
            }
            Command::Admin(a) => {
                let changes_bus = a.mutated_tab() == Some(AdminTab::Bus);
                let out = self.execute_admin(a).await;
                if changes_bus && out.is_ok() {
                    self.bus_loaded = false;
                }
                out
            }
            Command::Menu => Ok(render_menu(&nav_items(&self.portal.session.state()))),
            Command::Status => Ok(self.status()),
            Command::Help => Ok(format!("{}\n", COMMAND_HELP)),
            Command::Quit => Ok(String::new()),
        }
    }

    async fn execute_admin(&self, cmd: AdminCommand) -> PortalResult<String> {
        match self.admin.access() {
            Access::Granted(_) => {}
            Access::Forbidden => return Err(PortalError::unauthorized("admin access required")),
            _ => return Err(PortalError::unauthorized("login as an admin first")),
        }
        match cmd {
            AdminCommand::List(tab) => {
                let listing = self.admin.list(tab).await?;
                Ok(format!("== Admin: {} ==\n{}", tab, render_admin_listing(&listing)))
            }
            AdminCommand::Add(tab, fields) => {
                let id = match tab {
                    AdminTab::Timetable => self.admin.add_timetable(&timetable_create(&fields)?).await?.id,
                    AdminTab::Bus => self.admin.add_bus(&bus_create(&fields)?).await?.id,
                    AdminTab::Canteen => self.admin.add_canteen(&canteen_create(&fields)?).await?.id,
                };
                Ok(format!("created {} entry {}\n", tab, id))
            }
            AdminCommand::Update(tab, id, fields) => {
                match tab {
                    AdminTab::Timetable => { self.admin.update_timetable(id, &timetable_update(&fields)?).await?; }
                    AdminTab::Bus => { self.admin.update_bus(id, &bus_update(&fields)?).await?; }
                    AdminTab::Canteen => { self.admin.update_canteen(id, &canteen_update(&fields)?).await?; }
                }
                Ok(format!("updated {} entry {}\n", tab, id))
            }
            AdminCommand::Delete(tab, id) => {
                self.admin.delete(tab, id).await?;
                Ok(format!("deleted {} entry {}\n", tab, id))
            }
        }
    }

    fn status(&self) -> String {
        let st = self.portal.session.state();
        let session = match &st {
            AuthState::Authenticated(u) => format!("{}{}", u.username, if u.is_admin { " (admin)" } else { "" }),
            AuthState::Anonymous => "anonymous".to_string(),
            AuthState::Unknown | AuthState::Checking => "checking".to_string(),
        };
        let rows = vec![
            vec!["api".to_string(), self.portal.config.api_url.to_string()],
            vec!["session file".to_string(), self.portal.config.session_file.display().to_string()],
            vec!["session".to_string(), session],
        ];
        render_table(&["Setting", "Value"], &rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kv(pairs: &[(&str, &str)]) -> Vec<(String, String)> { pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect() }

    #[test]
    fn quoted_args_stay_together() {
        assert_eq!(split_args(r#"admin timetable add subject="Data Structures" room=A1"#),
            vec!["admin", "timetable", "add", "subject=Data Structures", "room=A1"]);
        assert_eq!(split_args(r#"login asha """#), vec!["login", "asha", ""]);
    }

    #[test]
    fn parses_page_commands() {
        assert_eq!(parse_command("timetable").unwrap(), Command::Timetable(DayArg::Today));
        assert_eq!(parse_command("timetable all").unwrap(), Command::Timetable(DayArg::All));
        assert_eq!(parse_command("Timetable tue").unwrap(), Command::Timetable(DayArg::Day(Weekday::Tuesday)));
        assert_eq!(parse_command("bus route 12").unwrap(), Command::Bus("route 12".into()));
        assert_eq!(parse_command("canteen monday lunch").unwrap(), Command::Canteen { day: DayArg::Day(Weekday::Monday), category: Some("lunch".into()) });
        assert!(parse_command("timetable someday").is_err());
        assert!(parse_command("dance").is_err());
    }

    #[test]
    fn parses_admin_commands() {
        assert_eq!(parse_command("admin").unwrap(), Command::Admin(AdminCommand::List(AdminTab::Timetable)));
        assert_eq!(parse_command("admin bus delete 4").unwrap(), Command::Admin(AdminCommand::Delete(AdminTab::Bus, 4)));
        assert_eq!(
            parse_command("admin canteen update 9 price=12.5").unwrap(),
            Command::Admin(AdminCommand::Update(AdminTab::Canteen, 9, kv(&[("price", "12.5")])))
        );
        assert!(parse_command("admin bus update 9").is_err());
        assert!(parse_command("admin bus add route").is_err());
        assert!(parse_command("admin library").is_err());
    }

    #[test]
    fn payload_builders_validate() {
        let t = timetable_create(&kv(&[("day", "Monday"), ("time", "09:00"), ("subject", "Maths"), ("room", "A1")])).unwrap();
        assert_eq!(t.day, Weekday::Monday);
        assert!(timetable_create(&kv(&[("day", "Monday")])).is_err());
        assert!(bus_create(&kv(&[("route", "R1"), ("time", "07:00"), ("bus_no", "B1"), ("driver", "x")])).is_err());

        let c = canteen_create(&kv(&[("day", "Friday"), ("item", "Idli"), ("price", "30")])).unwrap();
        assert_eq!(c.category, MenuCategory::Other("other".into()));
        assert!(canteen_create(&kv(&[("day", "Friday"), ("item", "Idli"), ("price", "-3")])).is_err());

        let u = canteen_update(&kv(&[("category", "snacks")])).unwrap();
        assert_eq!(u.category, Some(MenuCategory::Snacks));
        assert_eq!(u.price, None);
    }
}
