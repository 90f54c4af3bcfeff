/// Toolbar icon and title for the active tab
use crate::visit::Visit;

pub const VISITED_ICON: &str = "ic_visited_48.png";
pub const NOT_VISITED_ICON: &str = "ic_not_visited_48.png";

#[derive(Debug, Clone, PartialEq)]
pub enum Indicator {
    Visited(Visit),
    NotVisited,
}

impl Indicator {
    pub fn from_lookup(visit: Option<Visit>) -> Indicator {
        match visit {
            Some(visit) => Indicator::Visited(visit),
            None => Indicator::NotVisited,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Indicator::Visited(_) => VISITED_ICON,
            Indicator::NotVisited => NOT_VISITED_ICON,
        }
    }

    pub fn title(&self) -> String {
        match self {
            Indicator::Visited(visit) => format!("Was visited! {}", visit),
            Indicator::NotVisited => "Was not visited".to_string(),
        }
    }
}
