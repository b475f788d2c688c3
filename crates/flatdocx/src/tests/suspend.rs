use std::cell::RefCell;
use std::sync::Arc;

use futures::future::{FutureExt, LocalBoxFuture};

use super::*;

/// Yields to the runtime before every image and records the lookup order.
struct YieldingResolver {
    data: Vec<u8>,
    lookups: RefCell<Vec<String>>,
}

impl YieldingResolver {
    fn new(width: u32, height: u32) -> Self {
        Self {
            data: png(width, height),
            lookups: RefCell::new(Vec::new()),
        }
    }
}

impl ImageResolver for YieldingResolver {
    fn resolve<'a>(&'a self, src: &'a str) -> LocalBoxFuture<'a, Result<Arc<[u8]>>> {
        async move {
            tokio::task::yield_now().await;
            self.lookups.borrow_mut().push(src.to_owned());
            Ok(Arc::from(self.data.as_slice()))
        }
        .boxed_local()
    }
}

fn document_with_images() -> Node {
    doc([
        para(&["start"]),
        image("a.png", None),
        node(
            "table",
            [node(
                "table_row",
                [
                    node("table_cell", [image("b.png", Some(100.0))]),
                    node("table_cell", [para(&["between"]), image("c.png", Some(50.0))]),
                ],
            )],
        ),
        node(
            "paragraph",
            [
                text("note"),
                node("footnote", [text("in footnote")]),
            ],
        ),
        image("d.png", None).with_attrs(Attrs::new().with("src", "d.png").with("align", "right")),
        para(&["end"]),
    ])
}

#[tokio::test]
async fn suspending_resolver_keeps_source_order() {
    let resolver = YieldingResolver::new(20, 10);
    let desc = Serializer::default()
        .serialize_async(&document_with_images(), &resolver)
        .await
        .unwrap();

    assert_eq!(*resolver.lookups.borrow(), ["a.png", "b.png", "c.png", "d.png"]);
    insta::assert_snapshot!(dump(&desc), @r#"
    section 0
      p: "start"
      p align=center: img(a.png 420x210)
      table
        row
          cell
            p align=center: img(b.png 300x150)
          cell
            p: "between"
            p align=center: img(c.png 150x75)
      p
      p: "note" ^1
      p align=right: img(d.png 420x210)
      p: "end"
    footnote 1
      p: "in footnote"
    "#);
}

#[tokio::test]
async fn suspending_and_ready_resolvers_agree() {
    let doc = document_with_images();
    let suspended = Serializer::default()
        .serialize_async(&doc, &YieldingResolver::new(20, 10))
        .await
        .unwrap();
    let ready = Serializer::default()
        .serialize(&doc, &png_resolver(20, 10))
        .unwrap();

    assert_eq!(suspended, ready);
}

#[test]
fn resolver_failure_propagates() {
    let err = serialize(&doc([image("missing.png", None)])).unwrap_err();
    assert!(err.to_string().contains("missing.png"));
}

#[test]
fn undecodable_image_is_skipped() {
    let junk = FnResolver(|_src: &str| -> Result<Vec<u8>> { Ok(b"not an image".to_vec()) });
    let doc = doc([image("junk.bin", None), para(&["next"])]);

    let desc = Serializer::default().serialize(&doc, &junk).unwrap();
    insta::assert_snapshot!(dump(&desc), @r#"
    section 0
      p
      p: "next"
    "#);
}

#[test]
fn image_without_src_is_rejected() {
    let doc = doc([Node::new("image")]);
    let err = Serializer::default()
        .serialize(&doc, &png_resolver(1, 1))
        .unwrap_err();

    assert!(err.to_string().contains("`src`"));
}
