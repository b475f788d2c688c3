use super::*;
use crate::output::{ListStyle, NumberingRef};

fn item(content: impl IntoIterator<Item = Node>) -> Node {
    node("list_item", content)
}

fn numbering(desc: &DocumentDescription) -> Vec<Option<NumberingRef>> {
    desc.sections[0]
        .children
        .iter()
        .map(|block| paragraph(block).options.numbering.clone())
        .collect()
}

fn at(level: usize) -> Option<NumberingRef> {
    Some(NumberingRef {
        reference: "num-1".into(),
        level,
    })
}

#[test]
fn nested_lists_share_one_definition() {
    let doc = doc([
        node(
            "ordered_list",
            [item([
                para(&["1"]),
                node(
                    "bullet_list",
                    [item([
                        para(&["2"]),
                        node("ordered_list", [item([para(&["3"])])]),
                    ])],
                ),
            ])],
        ),
        para(&["after"]),
    ]);

    let desc = serialize(&doc).unwrap();
    assert_eq!(desc.numbering.len(), 1);
    assert_eq!(desc.numbering[0].style, ListStyle::Numbered);
    assert_eq!(numbering(&desc), [at(0), at(1), at(2), None]);
}

#[test]
fn sibling_lists_get_their_own_definitions() {
    let doc = doc([
        node("bullet_list", [item([para(&["a"])])]),
        node("ordered_list", [item([para(&["b"])])]),
    ]);

    let desc = serialize(&doc).unwrap();
    let references: Vec<_> = desc.numbering.iter().map(|def| def.reference.as_str()).collect();
    assert_eq!(references, ["num-1", "num-2"]);
    assert_eq!(desc.numbering[0].style, ListStyle::Bullets);
    assert_eq!(desc.numbering[1].style, ListStyle::Numbered);
}

#[test]
fn only_the_first_paragraph_of_an_item_is_numbered() {
    let doc = doc([node("bullet_list", [item([para(&["a"]), para(&["b"])])])]);

    let desc = serialize(&doc).unwrap();
    assert_eq!(numbering(&desc), [at(0), None]);
}

#[test]
fn list_item_outside_a_list_fails() {
    let err = serialize(&doc([item([para(&["stray"])])])).unwrap_err();

    assert!(err.is_no_active_list());
    assert_eq!(
        err.to_string(),
        "trying to create a list item without a list"
    );
}
