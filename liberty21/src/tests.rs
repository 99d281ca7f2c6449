use super::read::{parse_str, LibertyLexer, Token};
use super::*;

#[test]
fn it_lexes() -> LibertyResult<()> {
    let src = "cell (INV_X1) { value : 0.1; } /* commentary */ \n";
    let lex = LibertyLexer::new(src)?;
    let toks_vec: Vec<Token> = lex.collect(); // Collect up all tokens
    let tok_strs: Vec<&str> = toks_vec.iter().map(|t| t.substr(src)).collect();
    assert_eq!(
        tok_strs,
        vec!["cell", "(", "INV_X1", ")", "{", "value", ":", "0.1", ";", "}"]
    );
    Ok(())
}

#[test]
fn it_roundtrips() -> LibertyResult<()> {
    let src = r#"
    library (roundtrip) {
        nom_voltage : 1.1;
        nom_temperature : 25;
        cell (NAND2_X1) {
            leakage_power () {
                value : 0.0021;
                when : "!A & !B";
                related_pg_pin : VDD;
            }
            pin (A) {
                direction : input;
                capacitance : 0.0016;
                rise_capacitance_range (0.0015, 0.0018);
            }
            pin (Y) {
                direction : output;
                function : "!(A & B)";
                timing () {
                    related_pin : "A";
                    cell_rise (delay_template_2x2) {
                        index_1 ("0.01, 0.02");
                        index_2 ("0.1, 0.2");
                        values ( \
                            "0.11, 0.12", \
                            "0.21, 0.22" \
                        );
                    }
                }
            }
        }
    }
    "#;
    // A parse-write-parse loop lands on the same tree...
    let tree = parse_str(src)?;
    let text = tree.to_string()?;
    let tree2 = parse_str(&text)?;
    assert_eq!(tree, tree2);
    // ...and a second write is byte-identical to the first
    assert_eq!(text, tree2.to_string()?);
    Ok(())
}

#[test]
fn it_preserves_statement_order() -> LibertyResult<()> {
    let src = r#"
    library (ordered) {
        cell (Z) { }
        cell (A) { }
        cell (M) { }
    }
    "#;
    let tree = parse_str(src)?;
    let names: Vec<&str> = tree.groups[0]
        .sub_groups("cell")
        .map(|g| g.name().unwrap())
        .collect();
    assert_eq!(names, vec!["Z", "A", "M"]);
    Ok(())
}

#[test]
fn it_creates_and_deletes_attrs() -> LibertyResult<()> {
    let mut group = LibertyGroup::new("leakage_power");

    // Create a complex attribute and append to it
    let attr = group.create_attr("index_1", LibertyAttrKind::Complex)?;
    attr.push_value("0.01, 0.02")?;
    assert_eq!(group.complex_values("index_1").unwrap().len(), 1);

    // Creating a second attribute of the same name is an error
    assert!(group.create_attr("index_1", LibertyAttrKind::Complex).is_err());

    // Appending to a simple attribute is an error
    group.set_simple("value", 0.5);
    assert!(group.find_attr_mut("value").unwrap().push_value(1.0).is_err());

    // Set-simple overwrites in place, create-after-delete starts fresh
    group.set_simple("value", 0.25);
    assert_eq!(group.simple_value("value"), Some(&LibertyValue::Float(0.25)));
    assert!(group.delete_attr("index_1"));
    assert!(!group.delete_attr("index_1"));
    assert_eq!(group.complex_values("index_1"), None);
    Ok(())
}

#[test]
fn it_writes_created_attrs() -> LibertyResult<()> {
    // Mutate a parsed tree and check the written form
    let src = "library (l) { cell (c) { leakage_power () { value : 1.0; } } }";
    let mut tree = parse_str(src)?;
    let leakage = tree.groups[0]
        .sub_groups_mut("cell")
        .next()
        .unwrap()
        .sub_groups_mut("leakage_power")
        .next()
        .unwrap();
    leakage.set_simple("when", "!A");
    leakage.set_simple("value", 0.125);
    let text = tree.to_string()?;
    assert!(text.contains("when : \"!A\";"));
    assert!(text.contains("value : 0.125;"));
    Ok(())
}

#[test]
fn it_serializes_trees() -> LibertyResult<()> {
    // Trees are serde-encodable alongside their native text form,
    // for inspection and comparison
    use charlib21utils::SerializationFormat::{Json, Yaml};
    let tree = parse_str("library (l) { nom_voltage : 1.1; cell (c) { } }")?;
    for fmt in [Json, Yaml] {
        let doc = fmt.to_string(&tree)?;
        let back: LibertyTree = fmt.from_str(&doc)?;
        assert_eq!(tree, back);
    }
    Ok(())
}

#[test]
fn it_parses_multiline_strings() -> LibertyResult<()> {
    // Multi-row tables sometimes arrive as one quoted string spanning lines
    let src = "library (l) { t (x) { values (\"0.1, 0.2\n0.3, 0.4\"); } }";
    let tree = parse_str(src)?;
    let values = tree.groups[0].groups[0].complex_values("values").unwrap();
    assert_eq!(
        values,
        &[LibertyValue::String("0.1, 0.2\n0.3, 0.4".to_string())][..]
    );
    Ok(())
}
