use gridiron::{
    Config, Control, ControlHandle, ControlRegistry, DiagnosticKind, GridError, Label, Page,
    PageStatus, RegisteredControl, RenderContext, SharedText, ERROR_MARKER,
};
use pretty_assertions::assert_eq;
use std::any::Any;
use std::fs;
use std::path::PathBuf;

fn fixtures_dir() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path
}

fn config() -> Config {
    Config::new("gi", fixtures_dir()).unwrap()
}

fn open(template: &str) -> Page {
    Page::open(config(), &ControlRegistry::with_builtin(), template).unwrap()
}

/// A control defined outside the crate, registered like the built-ins.
struct Shout {
    text: String,
}

impl Control for Shout {
    fn control_type(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn render_tag(&self) -> &'static str {
        "strong"
    }

    fn render(&self, ctx: &RenderContext<'_>) -> String {
        format!("<strong id=\"{}\">{}</strong>", ctx.id(), self.text.to_uppercase())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl RegisteredControl for Shout {
    const TYPE_NAME: &'static str = "Shout";
    const ALLOW_AUTONOMOUS: bool = true;

    fn from_markup(id: &str) -> Self {
        Shout {
            text: id.to_string(),
        }
    }
}

// Full pipeline
#[test]
fn test_testapp_renders() {
    let mut page = open("testapp.html");
    assert_eq!(page.status(), PageStatus::ParsedReady);

    page.register_variable("app.title", SharedText::new("GridIron Demo"));
    page.add_control(ControlHandle::ROOT, "user", Label::with_text("alice"))
        .unwrap();

    let expected = "<!DOCTYPE html>
<html>
  <head>
    <title>GridIron Demo</title>
  </head>
  <body>
    <!-- greeting is created from markup -->
    <div style=\"align: left;\">Hello <b>world</b></div>
    <p>Signed in as <div style=\"align: left;\">alice</div></p>
    <footer>Served from testapp.html</footer>
  </body>
</html>
";
    assert_eq!(page.render(), expected);
    assert_eq!(page.status(), PageStatus::RenderedReady);
    assert!(page.diagnostics().is_empty());
}

#[test]
fn test_render_twice_is_identical() {
    let mut page = open("testapp.html");
    page.register_variable("app.title", SharedText::new("t"));
    page.add_control(ControlHandle::ROOT, "user", Label::new())
        .unwrap();
    let first = page.render();
    assert_eq!(page.render(), first);
}

#[test]
fn test_plain_template_round_trips() {
    let source = fs::read_to_string(fixtures_dir().join("plain.html")).unwrap();
    let mut page = open("plain.html");
    assert_eq!(page.render(), source);
}

#[test]
fn test_builtin_variables_from_disk() {
    let page = open("testapp.html");
    let path = fixtures_dir().join("testapp.html");
    assert_eq!(page.template_path(), Some(path.as_path()));
    assert_eq!(
        page.variable("gi.frontPage"),
        Some(path.display().to_string())
    );
    assert_eq!(page.variable("gi.namespace"), Some("gi".to_string()));
    assert_eq!(page.id(), "gi::Page::testapp.html");
}

#[test]
fn test_autonomous_label_text_variable() {
    let page = open("testapp.html");
    assert_eq!(
        page.variable("greeting.Text"),
        Some("Hello <b>world</b>".to_string())
    );
}

// Failure paths
#[test]
fn test_undeclared_control_renders_marker() {
    let mut page = open("testapp.html");
    page.register_variable("app.title", SharedText::new("t"));
    let output = page.render();

    assert_eq!(output.matches(ERROR_MARKER).count(), 1);
    assert!(output.contains(&format!("Signed in as {ERROR_MARKER}</p>")));
    let kinds: Vec<&DiagnosticKind> = page.diagnostics().iter().map(|d| &d.kind).collect();
    assert_eq!(kinds, vec![&DiagnosticKind::Unresolved { id: "user".into() }]);
}

#[test]
fn test_empty_registry_leaves_autonomous_tags_unbound() {
    let mut page = Page::open(config(), &ControlRegistry::new(), "testapp.html").unwrap();
    let unknown = page
        .diagnostics()
        .iter()
        .filter(|d| matches!(d.kind, DiagnosticKind::UnknownControlType { .. }))
        .count();
    assert_eq!(unknown, 3);
    assert_eq!(page.render().matches(ERROR_MARKER).count(), 4);
}

#[test]
fn test_missing_template() {
    let err = Page::open(config(), &ControlRegistry::with_builtin(), "nope.html")
        .err()
        .unwrap();
    match err {
        GridError::FileOpen { path, .. } => assert_eq!(path, fixtures_dir().join("nope.html")),
        other => panic!("expected FileOpen, got {other:?}"),
    }
}

#[test]
fn test_empty_template() {
    let err = Page::open(config(), &ControlRegistry::with_builtin(), "empty.html")
        .err()
        .unwrap();
    assert!(matches!(err, GridError::EmptyTemplate { .. }));
}

#[test]
fn test_non_utf8_template() {
    let err = Page::open(config(), &ControlRegistry::with_builtin(), "latin1.html")
        .err()
        .unwrap();
    match err {
        GridError::Encoding { path, .. } => assert_eq!(path, fixtures_dir().join("latin1.html")),
        other => panic!("expected Encoding, got {other:?}"),
    }
}

#[test]
fn test_unclosed_comment_renders_unchanged() {
    let source = "<p>hi</p><!-- todo";
    let mut page =
        Page::from_source(config(), &ControlRegistry::with_builtin(), "todo.html", source)
            .unwrap();
    assert_eq!(page.render(), source);
    assert!(matches!(
        page.diagnostics()[0].kind,
        DiagnosticKind::MalformedMarkup { .. }
    ));
}

#[test]
fn test_duplicate_ids_rejected() {
    let mut page = open("testapp.html");
    // "greeting" was created from markup during construction
    let err = page
        .add_control(ControlHandle::ROOT, "greeting", Label::new())
        .unwrap_err();
    assert!(matches!(err, GridError::DuplicateIdentifier { .. }));
}

// Custom controls
#[test]
fn test_custom_control_type() {
    let mut registry = ControlRegistry::with_builtin();
    registry.register::<Shout>();

    let mut page = Page::from_source(
        config(),
        &registry,
        "shout.html",
        "<p><gi::Shout id=\"hey\" auto=\"true\"></gi::Shout></p>",
    )
    .unwrap();
    assert_eq!(page.render(), "<p><strong id=\"hey\">HEY</strong></p>");
    assert_eq!(
        page.namespaced_tag(page.find("hey").unwrap()),
        Some("gi::Shout".to_string())
    );
}

#[test]
fn test_config_file() {
    let config = Config::load(&fixtures_dir().join("gridiron.toml")).unwrap();
    assert_eq!(config.namespace, "gi");
    assert_eq!(config.document_root, PathBuf::from("."));
}
