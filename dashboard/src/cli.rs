use std::collections::HashSet;
use std::fmt::Write as _;
use std::str::FromStr;
use std::sync::Arc;

use basket_shared::Basket;
use tokio::sync::{broadcast, watch};
use tokio::sync::broadcast::error::RecvError;

use crate::actions::{ActionOutcome, Actions, Controls, Precondition, Trigger};
use crate::map::{CircleKind, MapScene, MapView, project};
use crate::metrics::{ExpandedBaskets, Metrics, basket_list};
use crate::state::{DashboardState, Notification};

pub const HELP: &str = "\
commands:
  regions                 list selectable regions
  select <name>[, ...]    replace the selection
  clear                   empty the selection
  orders                  create orders in the selected regions
  baskets                 group the current orders into baskets
  reset                   clear orders, baskets and selection
  show                    map scene and metrics
  list                    basket list
  toggle <n>              expand or collapse basket n
  help                    this text
  quit                    exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Regions,
    Select(Vec<String>),
    Clear,
    Orders,
    Baskets,
    Reset,
    Show,
    List,
    Toggle(usize),
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map(|(word, rest)| (word, rest.trim()))
            .unwrap_or((line, ""));

        match word.to_ascii_lowercase().as_str() {
            "regions" => Ok(Self::Regions),
            "select" => {
                let names: Vec<String> = rest
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect();
                if names.is_empty() {
                    return Err("select needs at least one region name".to_string());
                }
                Ok(Self::Select(names))
            }
            "clear" => Ok(Self::Clear),
            "orders" => Ok(Self::Orders),
            "baskets" => Ok(Self::Baskets),
            "reset" => Ok(Self::Reset),
            "show" => Ok(Self::Show),
            "list" => Ok(Self::List),
            "toggle" => rest
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .map(|n| Self::Toggle(n - 1))
                .ok_or_else(|| format!("toggle needs a basket number, got {rest:?}")),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            "" => Err("empty command".to_string()),
            other => Err(format!("unknown command {other:?}; try help")),
        }
    }
}

/// Background request started from the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    Orders,
    Baskets,
}

impl Job {
    pub fn name(self) -> &'static str {
        match self {
            Self::Orders => "orders",
            Self::Baskets => "baskets",
        }
    }

    pub async fn run(self, actions: &Actions) -> ActionOutcome {
        match self {
            Self::Orders => actions.create_orders().await,
            Self::Baskets => actions.create_baskets().await,
        }
    }
}

/// Terminal rendition of the dashboard page.
pub struct Session {
    actions: Actions,
    expanded: ExpandedBaskets,
    baskets_seen: watch::Receiver<Arc<Vec<Basket>>>,
    view: MapView,
}

impl Session {
    pub fn new(actions: Actions) -> Self {
        let baskets_seen = actions.state().baskets.subscribe();
        Self {
            actions,
            expanded: ExpandedBaskets::default(),
            baskets_seen,
            view: MapView::default(),
        }
    }

    /// Expanded entries refer to list positions, so they are dropped whenever a
    /// new basket list replaces the one they were opened on.
    fn sync_expansion(&mut self) {
        if self.baskets_seen.has_changed().unwrap_or(false) {
            self.baskets_seen.mark_unchanged();
            self.expanded.clear();
        }
    }

    fn state(&self) -> &DashboardState {
        self.actions.state()
    }

    /// Apply one command and return the text to print, or `None` to exit.
    /// Order and basket creation run as background tasks.
    pub fn handle(&mut self, command: Command) -> Option<String> {
        self.sync_expansion();
        let output = match command {
            Command::Quit => return None,
            Command::Help => HELP.to_string(),
            Command::Regions => self.render_regions(),
            Command::Select(names) => {
                let state = self.state();
                let kept = state.selection.set_from_names(&names, &state.catalog);
                let requested = names.iter().collect::<HashSet<_>>().len();
                let mut out = format!("selected {kept} of {requested} region(s)");
                if kept < requested {
                    out.push_str(" (unknown names ignored)");
                }
                out
            }
            Command::Clear => {
                self.state().selection.clear();
                "selection cleared".to_string()
            }
            Command::Orders => {
                let trigger = self.actions.controls().create_orders;
                self.spawn_action(trigger, Job::Orders)
            }
            Command::Baskets => {
                let trigger = self.actions.controls().create_baskets;
                self.spawn_action(trigger, Job::Baskets)
            }
            Command::Reset => {
                self.actions.reset();
                self.expanded.clear();
                "reset".to_string()
            }
            Command::Show => {
                let state = self.state();
                let scene = project(
                    &state.selection.regions(),
                    &state.orders.value(),
                    &state.baskets.value(),
                );
                let mut out = render_scene(&scene, &self.view);
                let metrics = Metrics::from_state(state);
                if metrics.visible() {
                    out.push('\n');
                    out.push_str(&render_metrics(metrics));
                }
                out.push('\n');
                out.push_str(&render_controls(&self.actions.controls()));
                out
            }
            Command::List => render_basket_list(&self.state().baskets.value(), &self.expanded),
            Command::Toggle(index) => {
                if index >= self.state().baskets.len() {
                    format!("no basket {}", index + 1)
                } else {
                    self.expanded.toggle(index);
                    render_basket_list(&self.state().baskets.value(), &self.expanded)
                }
            }
        };
        Some(output)
    }

    fn spawn_action(&self, trigger: Trigger, job: Job) -> String {
        if !trigger.enabled {
            return format!("{} is not available right now", trigger.label);
        }
        let actions = self.actions.clone();
        tokio::spawn(async move {
            let outcome = job.run(&actions).await;
            println!("{}", render_outcome(job.name(), &outcome));
        });
        format!("creating {}...", job.name())
    }

    fn render_regions(&self) -> String {
        let catalog = &self.state().catalog;
        if catalog.is_empty() {
            return "no regions loaded yet".to_string();
        }
        let selected = self.state().selection.values();
        catalog
            .options()
            .into_iter()
            .map(|name| {
                let mark = if selected.contains(&name) { "x" } else { " " };
                format!("[{mark}] {name}")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn render_metrics(metrics: Metrics) -> String {
    format!(
        "Total Orders: {}  Baskets: {}",
        metrics.orders, metrics.baskets
    )
}

pub fn render_controls(controls: &Controls) -> String {
    [controls.create_orders, controls.create_baskets, controls.reset]
        .iter()
        .map(|trigger| {
            if trigger.enabled {
                format!("[{}]", trigger.label)
            } else {
                format!("({})", trigger.label)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn render_scene(scene: &MapScene, view: &MapView) -> String {
    let mut out = format!(
        "map @ {:.4}, {:.4} zoom {}: {} polygon(s), {} basket(s), {} order point(s)",
        view.center.lat,
        view.center.lng,
        view.zoom,
        scene.polygons.len(),
        scene.count(CircleKind::Basket),
        scene.count(CircleKind::Order) + scene.count(CircleKind::BasketOrder),
    );
    for circle in scene.circles.iter().filter(|c| c.kind == CircleKind::Basket) {
        let _ = write!(
            out,
            "\n  {} ({:.4}, {:.4}) r={:.0}m: {}",
            circle.key,
            circle.center.lat,
            circle.center.lng,
            circle.radius_m,
            circle.popup.join(" "),
        );
    }
    out
}

pub fn render_basket_list(baskets: &[basket_shared::Basket], expanded: &ExpandedBaskets) -> String {
    if baskets.is_empty() {
        return "no baskets".to_string();
    }
    let mut out = String::new();
    for (index, entry) in basket_list(baskets).into_iter().enumerate() {
        let open = expanded.is_open(index);
        let _ = writeln!(
            out,
            "{} {}  {}  {}",
            if open { "v" } else { ">" },
            entry.title,
            entry.order_count,
            entry.radius
        );
        if open {
            for line in entry.orders {
                let _ = writeln!(out, "    {}  {}", line.label, line.coordinates);
            }
        }
    }
    out.trim_end().to_string()
}

pub fn render_outcome(action: &str, outcome: &ActionOutcome) -> String {
    match outcome {
        ActionOutcome::Applied { count } => format!("{action}: {count} created"),
        ActionOutcome::Skipped(Precondition::EmptySelection) => {
            format!("{action}: select at least one region first")
        }
        ActionOutcome::Skipped(Precondition::NoOrders) => {
            format!("{action}: create orders first")
        }
        ActionOutcome::Suppressed => format!("{action}: already in progress"),
        ActionOutcome::Discarded => format!("{action}: result superseded, not applied"),
        ActionOutcome::Failed(notification) => render_notification(notification),
    }
}

pub fn render_notification(notification: &Notification) -> String {
    format!(
        "! {} [{}]: {}",
        notification.title,
        notification.raised_at.format("%H:%M:%S"),
        notification.description
    )
}

/// Print the metrics line whenever the order or basket store changes.
pub async fn watch_stores(state: DashboardState) {
    let mut orders = state.orders.subscribe();
    let mut baskets = state.baskets.subscribe();
    loop {
        tokio::select! {
            changed = orders.changed() => if changed.is_err() { break },
            changed = baskets.changed() => if changed.is_err() { break },
        }
        println!("{}", render_metrics(Metrics::from_state(&state)));
    }
}

/// Print failure notifications as they are raised.
pub async fn print_notifications(mut notifications: broadcast::Receiver<Notification>) {
    loop {
        match notifications.recv().await {
            Ok(notification) => eprintln!("{}", render_notification(&notification)),
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "notification display fell behind");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use basket_shared::{Basket, Geometry, Order, Region};

    use super::*;
    use crate::http::ApiClient;

    fn session() -> Session {
        let state = DashboardState::new();
        state.catalog.apply(vec![
            Region::new("Kadikoy", Geometry::Polygon(vec![vec![[29.03, 40.99]]])),
            Region::new("Besiktas", Geometry::Polygon(vec![vec![[29.0, 41.04]]])),
        ]);
        Session::new(Actions::new(state, ApiClient::new("").expect("build client")))
    }

    #[test]
    fn parses_commands() {
        assert_eq!(
            "select Kadikoy, Besiktas ,".parse::<Command>(),
            Ok(Command::Select(vec![
                "Kadikoy".to_string(),
                "Besiktas".to_string()
            ]))
        );
        assert_eq!("  SHOW ".parse::<Command>(), Ok(Command::Show));
        assert_eq!("toggle 2".parse::<Command>(), Ok(Command::Toggle(1)));
        assert!("toggle 0".parse::<Command>().is_err());
        assert!("select".parse::<Command>().is_err());
        assert!("launch".parse::<Command>().is_err());
    }

    #[test]
    fn select_and_regions_listing() {
        let mut session = session();
        let out = session
            .handle(Command::Select(vec!["Kadikoy".into(), "Moda".into()]))
            .expect("output");
        assert_eq!(out, "selected 1 of 2 region(s) (unknown names ignored)");

        let listing = session.handle(Command::Regions).expect("output");
        assert_eq!(listing, "[ ] Besiktas\n[x] Kadikoy");
    }

    #[test]
    fn repeated_names_are_not_reported_as_unknown() {
        let mut session = session();
        let out = session
            .handle(Command::Select(vec![
                "Kadikoy".into(),
                "Besiktas".into(),
                "Kadikoy".into(),
            ]))
            .expect("output");
        assert_eq!(out, "selected 2 of 2 region(s)");
    }

    #[test]
    fn disabled_triggers_do_not_spawn() {
        let mut session = session();
        assert_eq!(
            session.handle(Command::Orders).as_deref(),
            Some("Create Orders is not available right now")
        );
        assert_eq!(
            session.handle(Command::Baskets).as_deref(),
            Some("Baskets is not available right now")
        );
    }

    #[test]
    fn show_includes_metrics_once_orders_exist() {
        let mut session = session();
        session.handle(Command::Select(vec!["Kadikoy".into()]));
        let empty = session.handle(Command::Show).expect("output");
        assert!(empty.contains("1 polygon(s)"));
        assert!(!empty.contains("Total Orders"));
        assert!(empty.ends_with("[Create Orders] (Baskets) (Reset)"));

        session
            .state()
            .orders
            .replace(vec![Order::new(41.0, 29.0), Order::new(41.1, 29.1)]);
        let filled = session.handle(Command::Show).expect("output");
        assert!(filled.contains("Total Orders: 2  Baskets: 0"));
        assert!(filled.contains("2 order point(s)"));
    }

    #[test]
    fn toggle_expands_basket_orders() {
        let mut session = session();
        session.state().baskets.replace(vec![Basket {
            latitude: 41.0,
            longitude: 29.0,
            radius: 0.5,
            orders: vec![Order::new(41.0, 29.0)],
        }]);

        let collapsed = session.handle(Command::List).expect("output");
        assert_eq!(collapsed, "> Basket 1  1 order  Radius: 1.0 km");

        let expanded = session.handle(Command::Toggle(0)).expect("output");
        assert!(expanded.contains("Order 1  41.0000, 29.0000"));
        assert_eq!(
            session.handle(Command::Toggle(3)).as_deref(),
            Some("no basket 4")
        );
    }

    #[test]
    fn new_basket_list_starts_collapsed() {
        let basket = |latitude: f64| Basket {
            latitude,
            longitude: 29.0,
            radius: 0.5,
            orders: vec![Order::new(latitude, 29.0)],
        };
        let mut session = session();
        session.state().baskets.replace(vec![basket(41.0), basket(41.1)]);
        session.handle(Command::Toggle(1));

        session.state().baskets.replace(vec![basket(40.9), basket(40.8)]);
        let listing = session.handle(Command::List).expect("output");
        assert!(!listing.contains("Order 1"));
        assert!(listing.lines().all(|line| line.starts_with('>')));

        let reopened = session.handle(Command::Toggle(0)).expect("output");
        assert!(reopened.contains("Order 1  40.9000, 29.0000"));
        assert_eq!(session.handle(Command::List).as_deref(), Some(reopened.as_str()));
    }

    #[test]
    fn reset_and_quit() {
        let mut session = session();
        session.handle(Command::Select(vec!["Besiktas".into()]));
        session.state().orders.replace(vec![Order::new(41.0, 29.0)]);

        assert_eq!(session.handle(Command::Reset).as_deref(), Some("reset"));
        assert!(session.state().orders.is_empty());
        assert!(session.state().selection.is_empty());
        assert_eq!(session.handle(Command::Quit), None);
    }

    #[test]
    fn outcomes_read_naturally() {
        assert_eq!(
            render_outcome("orders", &ActionOutcome::Applied { count: 12 }),
            "orders: 12 created"
        );
        let failed = ActionOutcome::Failed(Notification::new(
            "Failed to create orders",
            "region not found",
        ));
        assert!(render_outcome("orders", &failed).ends_with("]: region not found"));
        assert_eq!(
            render_outcome("baskets", &ActionOutcome::Discarded),
            "baskets: result superseded, not applied"
        );
        assert_eq!(Job::Baskets.name(), "baskets");
    }
}
