use std::any::Any;

use crate::control::{BindContext, Control, RegisteredControl};
use crate::page::RenderContext;
use crate::tag::xml_encode;

/// Shows the escaped value of a page variable, with no wrapping element.
///
/// The variable is named by the tag's `key` attribute
/// (`<gi::Value id="v" key="gi.frontPage"/>`) unless set from code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Value {
    key: Option<String>,
}

impl Value {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
        }
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn set_key(&mut self, key: impl Into<String>) {
        self.key = Some(key.into());
    }
}

impl Control for Value {
    fn control_type(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn render(&self, ctx: &RenderContext<'_>) -> String {
        let value = match self.key.as_deref() {
            Some(key) => ctx.variable(key).unwrap_or_else(|| {
                tracing::warn!("Value '{}': no variable named '{}'", ctx.id(), key);
                String::new()
            }),
            None => {
                tracing::warn!("Value '{}' has no key", ctx.id());
                String::new()
            }
        };
        xml_encode(&value)
    }

    fn on_bind(&mut self, ctx: &BindContext<'_>) {
        if self.key.is_none() {
            self.key = ctx.attribute("key").map(str::to_string);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl RegisteredControl for Value {
    const TYPE_NAME: &'static str = "Value";
    const ALLOW_AUTONOMOUS: bool = true;

    fn from_markup(_id: &str) -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::control::ControlHandle;
    use crate::page::Page;
    use crate::registry::ControlRegistry;
    use crate::variables::SharedText;
    use pretty_assertions::assert_eq;

    fn page(source: &str) -> Page {
        Page::from_source(
            Config::default(),
            &ControlRegistry::with_builtin(),
            "value.html",
            source,
        )
        .unwrap()
    }

    #[test]
    fn test_key_from_markup() {
        let page = page("<gi::Value id=\"v\" auto=\"true\" key=\"gi.namespace\"/>");
        let v = page.find("v").unwrap();
        assert_eq!(page.control::<Value>(v).unwrap().key(), Some("gi.namespace"));
    }

    #[test]
    fn test_value_is_escaped() {
        let mut page = page("<title><gi::Value id=\"t\" key=\"app.title\"/></title>");
        page.register_variable("app.title", SharedText::new("Tom & \"Jerry\""));
        page.add_control(ControlHandle::ROOT, "t", Value::default()).unwrap();
        assert_eq!(
            page.render(),
            "<title>Tom &amp; &quot;Jerry&quot;</title>"
        );
    }

    #[test]
    fn test_key_from_code_wins() {
        let mut page = page("<gi::Value id=\"v\" key=\"gi.namespace\"/>");
        page.add_control(ControlHandle::ROOT, "v", Value::new("gi.codeBesideFilename"))
            .unwrap();
        assert_eq!(page.render(), "value.html");
    }

    #[test]
    fn test_missing_variable_renders_empty() {
        let mut page = page("<gi::Value id=\"v\" auto=\"true\" key=\"nope\"/>");
        assert_eq!(page.render(), "");
    }
}
