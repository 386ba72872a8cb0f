use std::any::Any;

use crate::control::{AttachContext, BindContext, Control, RegisteredControl};
use crate::page::RenderContext;
use crate::variables::SharedText;

/// A block of text.
///
/// Unless text is set from code, a label shows the markup written between
/// its tags, with any framework tags inside rendered by their controls.
/// Labels created from `auto="true"` tags publish their text as the
/// `<id>.Text` variable.
#[derive(Debug, Clone, Default)]
pub struct Label {
    text: SharedText,
    /// Inner markup captured at bind time.
    markup: Option<String>,
    explicit: bool,
}

impl Label {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: SharedText::new(text),
            markup: None,
            explicit: true,
        }
    }

    pub fn text(&self) -> String {
        self.text.get()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text.set(text);
        self.explicit = true;
    }

    /// Handle on the label's text storage.
    pub fn text_handle(&self) -> SharedText {
        self.text.clone()
    }

    /// True while the text is still the captured markup.
    fn shows_markup(&self) -> bool {
        !self.explicit
            && self
                .markup
                .as_ref()
                .is_some_and(|markup| *markup == self.text.get())
    }
}

impl Control for Label {
    fn control_type(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn render(&self, ctx: &RenderContext<'_>) -> String {
        let body = if self.shows_markup() {
            ctx.render_children()
        } else {
            self.text.get()
        };
        let tag = self.render_tag();
        format!("<{tag} style=\"align: left;\">{body}</{tag}>")
    }

    fn on_attach(&mut self, ctx: &mut AttachContext<'_>) {
        if !ctx.is_autonomous() {
            return;
        }
        let name = format!("{}.Text", ctx.id());
        if !ctx.register_variable(&name, self.text.clone()) {
            tracing::warn!("Label '{}' could not publish variable '{}'", ctx.id(), name);
        }
    }

    fn on_bind(&mut self, ctx: &BindContext<'_>) {
        if self.explicit {
            return;
        }
        let markup = ctx.inner_html();
        self.text.set(markup.clone());
        self.markup = Some(markup);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl RegisteredControl for Label {
    const TYPE_NAME: &'static str = "Label";
    const ALLOW_AUTONOMOUS: bool = true;

    fn from_markup(_id: &str) -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::control::ControlHandle;
    use crate::page::Page;
    use crate::registry::ControlRegistry;
    use pretty_assertions::assert_eq;

    fn page(source: &str) -> Page {
        Page::from_source(
            Config::default(),
            &ControlRegistry::with_builtin(),
            "label.html",
            source,
        )
        .unwrap()
    }

    #[test]
    fn test_autonomous_label_publishes_text_variable() {
        let page = page("<gi::Label id=\"greeting\" auto=\"true\">Hi <b>there</b></gi::Label>");
        assert_eq!(
            page.variable("greeting.Text"),
            Some("Hi <b>there</b>".to_string())
        );
    }

    #[test]
    fn test_declared_label_publishes_nothing() {
        let mut page = page("<gi::Label id=\"t\">x</gi::Label>");
        page.add_control(ControlHandle::ROOT, "t", Label::new()).unwrap();
        assert_eq!(page.variable("t.Text"), None);
    }

    #[test]
    fn test_text_changed_through_variable_handle() {
        let mut page = page("<gi::Label id=\"x\" auto=\"true\">old</gi::Label>");
        let x = page.find("x").unwrap();
        page.control::<Label>(x).unwrap().text_handle().set("new & <i>improved</i>");
        // text is not escaped
        assert_eq!(
            page.render(),
            "<div style=\"align: left;\">new & <i>improved</i></div>"
        );
    }

    #[test]
    fn test_set_text_overrides_markup() {
        let mut page = page("<gi::Label id=\"x\" auto=\"true\">old</gi::Label>");
        let x = page.find("x").unwrap();
        page.control_mut::<Label>(x).unwrap().set_text("new");
        assert_eq!(page.variable("x.Text"), Some("new".to_string()));
        assert_eq!(page.render(), "<div style=\"align: left;\">new</div>");
    }

    #[test]
    fn test_unbound_label_renders_its_text() {
        let mut page = Page::new(Config::default());
        let lbl = page.add_control(ControlHandle::ROOT, "lbl", Label::new()).unwrap();
        assert_eq!(page.render_control(lbl), "<div style=\"align: left;\"></div>");
    }
}
