use markdown_apps_engine::parsing::parse_to_tree;

/// The whole tree, positions included, as the parser hands it to the transform.
#[test]
fn inline_markup_tree() {
    let tree = parse_to_tree("Hello *world*");
    insta::assert_yaml_snapshot!(tree, @r#"
    Root:
      children:
        - Element:
            tag_name: p
            properties: {}
            children:
              - Text:
                  value: "Hello "
                  position:
                    start:
                      line: 1
                      column: 1
                      offset: 0
                    end:
                      line: 1
                      column: 7
                      offset: 6
              - Element:
                  tag_name: em
                  properties: {}
                  children:
                    - Text:
                        value: world
                        position:
                          start:
                            line: 1
                            column: 8
                            offset: 7
                          end:
                            line: 1
                            column: 13
                            offset: 12
                  position:
                    start:
                      line: 1
                      column: 7
                      offset: 6
                    end:
                      line: 1
                      column: 14
                      offset: 13
            position:
              start:
                line: 1
                column: 1
                offset: 0
              end:
                line: 1
                column: 14
                offset: 13
      position:
        start:
          line: 1
          column: 1
          offset: 0
        end:
          line: 1
          column: 14
          offset: 13
    "#);
}
