use super::*;

fn math(latex: &str) -> Node {
    node("math", [text(latex)])
}

fn equation(latex: &str) -> Node {
    node("equation", [text(latex)])
}

#[test]
fn inline_math_appends_to_the_line() {
    let doc = doc([node("paragraph", [text("if "), math("x>0"), text(" then")])]);

    let desc = serialize(&doc).unwrap();
    let p = paragraph(&desc.sections[0].children[0]);
    assert_eq!(dump_inlines(&p.children), r#""if " $x>0$ " then""#);
}

#[test]
fn numbered_equation_takes_over_the_line() {
    let doc = doc([
        equation("a^2+b^2=c^2").with_attrs(Attrs::new().with("numbered", true).with("id", "pythagoras")),
        equation("e^{i\\pi}+1=0").with_attrs(Attrs::new().with("numbered", true)),
        equation("1+1=2"),
    ]);

    let desc = serialize(&doc).unwrap();
    insta::assert_snapshot!(dump(&desc), @r#"
    section 0
      p tabs=4513,9026: <tab> $a^2+b^2=c^2$ <tab> "(" mark(pythagoras: #Equation) ")"
      p tabs=4513,9026: <tab> $e^{i\pi}+1=0$ <tab> "(" mark(eq-1: #Equation) ")"
      p: $1+1=2$
    "#);
}

#[test]
fn latex_attribute_wins_over_text() {
    let doc = doc([node(
        "paragraph",
        [Node::new("math").with_attrs(Attrs::new().with("latex", "\\alpha"))],
    )]);

    let desc = serialize(&doc).unwrap();
    let p = paragraph(&desc.sections[0].children[0]);
    assert_eq!(
        p.children,
        vec![Inline::Math {
            latex: "\\alpha".into()
        }]
    );
}

#[test]
fn captions_and_references() {
    let doc = doc([
        node("caption", [text("A cat")]).with_attrs(Attrs::new().with("id", "fig-cat")),
        node("caption", []).with_attrs(Attrs::new().with("sequence", "Table")),
        node(
            "paragraph",
            [
                text("as shown in "),
                Node::new("cross_reference").with_attrs(Attrs::new().with("id", "fig-cat")),
            ],
        ),
    ]);

    let desc = serialize(&doc).unwrap();
    insta::assert_snapshot!(dump(&desc), @r#"
    section 0
      p style=Caption: mark(fig-cat: "Figure " #Figure) ": " "A cat"
      p style=Caption: mark(seq-1: "Table " #Table) ": "
      p: "as shown in " ref(fig-cat: {REF fig-cat \h})
    "#);
}

#[test]
fn cross_reference_needs_an_id() {
    let doc = doc([node("paragraph", [Node::new("cross_reference")])]);

    let err = serialize(&doc).unwrap_err();
    assert!(err.to_string().contains("`id`"));
}
