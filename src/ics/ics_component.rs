//! Typed component tree built from the `ical` crate's parse output.

use ical::parser::ical::component::{IcalCalendar, IcalEvent, IcalTimeZone, IcalTimeZoneTransition};
use ical::property::Property as IcalProperty;
use std::fmt;

pub const VCALENDAR: &str = "VCALENDAR";
pub const VEVENT: &str = "VEVENT";
pub const VTIMEZONE: &str = "VTIMEZONE";
pub const VALARM: &str = "VALARM";
pub const STANDARD: &str = "STANDARD";
pub const DAYLIGHT: &str = "DAYLIGHT";

/// One content line: name, parameters and raw value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub params: Vec<(String, Vec<String>)>,
    pub value: Option<String>,
}

impl Property {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .and_then(|(_, values)| values.first())
            .map(String::as_str)
    }

    pub fn tzid(&self) -> Option<&str> {
        self.param("TZID")
    }

    pub fn value_type(&self) -> Option<&str> {
        self.param("VALUE")
    }

    /// Serialize back to a content line (`NAME;PARAM=VALUE:value`), without folding.
    pub fn to_ical_string(&self) -> String {
        let mut out = self.name.clone();
        for (key, values) in &self.params {
            out.push(';');
            out.push_str(key);
            out.push('=');
            let rendered: Vec<String> = values.iter().map(|v| quote_param(v)).collect();
            out.push_str(&rendered.join(","));
        }
        out.push(':');
        out.push_str(self.value.as_deref().unwrap_or_default());
        out
    }
}

fn quote_param(value: &str) -> String {
    if value.contains([':', ';', ',']) {
        format!("\"{value}\"")
    } else {
        value.to_string()
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ical_string())
    }
}

impl From<IcalProperty> for Property {
    fn from(prop: IcalProperty) -> Self {
        Self {
            name: prop.name.to_uppercase(),
            params: prop
                .params
                .unwrap_or_default()
                .into_iter()
                .map(|(key, values)| (key.to_uppercase(), values))
                .collect(),
            value: prop.value,
        }
    }
}

/// A component (`VEVENT`, `VTIMEZONE`, ...) with its properties and nested components.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Component {
    pub name: String,
    pub properties: Vec<Property>,
    pub components: Vec<Component>,
}

impl Component {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string(), ..Default::default() }
    }

    /// All direct subcomponents of the given kind.
    pub fn subcomponents<'c>(&'c self, kind: &'c str) -> impl Iterator<Item = &'c Component> {
        self.components.iter().filter(move |c| c.name == kind)
    }

    /// All properties of the given name, in source order.
    pub fn properties<'c>(&'c self, name: &'c str) -> impl Iterator<Item = &'c Property> {
        self.properties.iter().filter(move |p| p.name == name)
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Value of the first property with that name, if it has a non-empty value.
    pub fn property_value(&self, name: &str) -> Option<&str> {
        self.property(name)
            .and_then(|p| p.value.as_deref())
            .filter(|v| !v.is_empty())
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.property(name).is_some()
    }

    fn with_properties(name: &str, properties: Vec<IcalProperty>) -> Self {
        Self {
            name: name.to_string(),
            properties: properties.into_iter().map(Property::from).collect(),
            components: Vec::new(),
        }
    }
}

impl From<IcalEvent> for Component {
    fn from(event: IcalEvent) -> Self {
        let mut component = Component::with_properties(VEVENT, event.properties);
        component.components = event
            .alarms
            .into_iter()
            .map(|alarm| Component::with_properties(VALARM, alarm.properties))
            .collect();
        component
    }
}

impl From<IcalTimeZoneTransition> for Component {
    fn from(transition: IcalTimeZoneTransition) -> Self {
        use ical::parser::ical::component::IcalTimeZoneTransitionType;
        let name = match transition.transition {
            IcalTimeZoneTransitionType::STANDARD => STANDARD,
            IcalTimeZoneTransitionType::DAYLIGHT => DAYLIGHT,
        };
        Component::with_properties(name, transition.properties)
    }
}

impl From<IcalTimeZone> for Component {
    fn from(timezone: IcalTimeZone) -> Self {
        let mut component = Component::with_properties(VTIMEZONE, timezone.properties);
        component.components = timezone.transitions.into_iter().map(Component::from).collect();
        component
    }
}

impl From<IcalCalendar> for Component {
    fn from(calendar: IcalCalendar) -> Self {
        let mut component = Component::with_properties(VCALENDAR, calendar.properties);
        component
            .components
            .extend(calendar.timezones.into_iter().map(Component::from));
        component.components.extend(calendar.events.into_iter().map(Component::from));
        component
    }
}
