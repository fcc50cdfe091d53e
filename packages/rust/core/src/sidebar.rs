//! Sidebar module rendering.

use serde_json::{Value, json};

use docshift_shared::{INTRODUCTION_TITLE, NavNode, leaf_ids};

/// Document id of the generated introduction page.
pub const INTRO_ID: &str = "intro";

/// Render a sidebar that lets the generator walk the docs tree itself.
pub fn render_auto_sidebar(sidebar_name: &str) -> String {
    format!(
        "const sidebars = {{\n  {sidebar_name}: [{{type: 'autogenerated', dirName: '.'}}],\n}};\n\nmodule.exports = sidebars;\n"
    )
}

/// Render the navigation tree as a sidebar module.
///
/// Branches become categories in structure order, leaves become doc items.
pub fn render_nav_sidebar(sidebar_name: &str, navigation: &[NavNode]) -> String {
    let items = Value::Array(navigation.iter().map(sidebar_item).collect());
    let name = Value::String(sidebar_name.to_string());
    format!("const sidebars = {{\n  {name}: {items:#},\n}};\n\nmodule.exports = sidebars;\n")
}

/// Prepend the generated introduction page to `navigation` unless the
/// structure supplied an introduction or already has an `intro` document.
pub fn with_intro_leaf(mut navigation: Vec<NavNode>, has_introduction: bool) -> Vec<NavNode> {
    if has_introduction || leaf_ids(&navigation).contains(&INTRO_ID) {
        return navigation;
    }
    navigation.insert(
        0,
        NavNode {
            title: INTRODUCTION_TITLE.to_string(),
            id: INTRO_ID.to_string(),
            children: None,
        },
    );
    navigation
}

fn sidebar_item(node: &NavNode) -> Value {
    match &node.children {
        Some(children) => json!({
            "type": "category",
            "label": node.title,
            "items": children.iter().map(sidebar_item).collect::<Vec<_>>(),
        }),
        None => json!({
            "type": "doc",
            "id": node.id,
            "label": node.title,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nav() -> Vec<NavNode> {
        vec![
            NavNode {
                title: "Intro".into(),
                id: "intro".into(),
                children: None,
            },
            NavNode {
                title: "Lessons".into(),
                id: "Lessons".into(),
                children: Some(vec![NavNode {
                    title: "Lesson 1".into(),
                    id: "Lessons/l1".into(),
                    children: None,
                }]),
            },
        ]
    }

    #[test]
    fn auto_sidebar_uses_name() {
        let out = render_auto_sidebar("course");
        assert!(out.starts_with("const sidebars = {\n  course: [{type: 'autogenerated', dirName: '.'}],"));
        assert!(out.ends_with("module.exports = sidebars;\n"));
    }

    #[test]
    fn nav_sidebar_lists_categories_and_docs() {
        let out = render_nav_sidebar("sidebar", &nav());
        let start = out.find('[').unwrap();
        let end = out.rfind(']').unwrap();
        let items: Value = serde_json::from_str(&out[start..=end]).unwrap();

        assert_eq!(items[0]["type"], "doc");
        assert_eq!(items[0]["id"], "intro");
        assert_eq!(items[1]["type"], "category");
        assert_eq!(items[1]["label"], "Lessons");
        assert_eq!(items[1]["items"][0]["id"], "Lessons/l1");
        assert!(out.contains("\"sidebar\": ["));
    }

    #[test]
    fn intro_leaf_is_prepended_once() {
        let lessons: Vec<NavNode> = nav().into_iter().skip(1).collect();
        let with_intro = with_intro_leaf(lessons.clone(), false);
        assert_eq!(with_intro.len(), 2);
        assert_eq!(with_intro[0].id, INTRO_ID);
        assert_eq!(with_intro[0].title, INTRODUCTION_TITLE);

        // already present as a document
        assert_eq!(with_intro_leaf(nav(), false), nav());
        // supplied by the structure
        assert_eq!(with_intro_leaf(lessons.clone(), true), lessons);
    }

    #[test]
    fn nav_sidebar_is_pure() {
        assert_eq!(render_nav_sidebar("s", &nav()), render_nav_sidebar("s", &nav()));
    }
}
