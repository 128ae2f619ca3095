//! Documentation attachment: leading comments, javadoc-style blocks, and
//! same-line trailing comments.

use protoparse::{parse, EnumType, MessageType, ProtoFile};

fn message(file: &ProtoFile) -> &MessageType {
    file.types[0].as_message().unwrap()
}

fn enum_type(file: &ProtoFile) -> &EnumType {
    file.types[0].as_enum().unwrap()
}

#[test]
fn test_single_line_comment() {
    let proto = "// Test all the things!\nmessage Test {}";
    let file = parse("test.proto", proto).unwrap();
    assert_eq!(message(&file).documentation, "Test all the things!");
}

#[test]
fn test_multiple_single_line_comments() {
    let proto = "// Test all\n// the things!\nmessage Test {}";
    let file = parse("test.proto", proto).unwrap();
    assert_eq!(message(&file).documentation, "Test all\nthe things!");
}

#[test]
fn test_single_line_comments_with_leading_whitespace() {
    let proto = "// Test\n//   All\n//     The\n//       Things!\nmessage Test {}";
    let file = parse("test.proto", proto).unwrap();
    assert_eq!(
        message(&file).documentation,
        "Test\n  All\n    The\n      Things!"
    );
}

#[test]
fn test_single_line_doc_block() {
    let proto = "/** Test */\nmessage Test {}";
    let file = parse("test.proto", proto).unwrap();
    assert_eq!(message(&file).documentation, "Test");
}

#[test]
fn test_multiline_doc_block() {
    let proto = "/**\n * Test\n *\n * Foo\n */\nmessage Test {}";
    let file = parse("test.proto", proto).unwrap();
    assert_eq!(message(&file).documentation, "Test\n\nFoo");
}

#[test]
fn test_multiline_doc_block_with_leading_whitespace() {
    let proto = "/**\n * Test\n *   All\n *     The\n *       Things!\n */\nmessage Test {}";
    let file = parse("test.proto", proto).unwrap();
    assert_eq!(
        message(&file).documentation,
        "Test\n  All\n    The\n      Things!"
    );
}

#[test]
fn test_multiline_doc_block_without_leading_asterisks() {
    // Leading whitespace is not honored when the block lacks leading
    // asterisks.
    let proto = "/**\n Test\n   All\n     The\n       Things!\n */\nmessage Test {}";
    let file = parse("test.proto", proto).unwrap();
    assert_eq!(message(&file).documentation, "Test\nAll\nThe\nThings!");
}

#[test]
fn test_plain_block_comment_is_not_documentation() {
    let proto = "/* just a comment */\nmessage Test {}";
    let file = parse("test.proto", proto).unwrap();
    assert_eq!(message(&file).documentation, "");
}

#[test]
fn test_message_field_trailing_comment() {
    let proto = "message Test {\n  optional string name = 1; // Test all the things!\n}";
    let file = parse("test.proto", proto).unwrap();
    assert_eq!(
        message(&file).fields[0].documentation,
        "Test all the things!"
    );
}

#[test]
fn test_leading_and_trailing_comments_are_combined() {
    let proto = "message Test {\n  // Test all...\n  optional string name = 1; // ...the things!\n}";
    let file = parse("test.proto", proto).unwrap();
    assert_eq!(
        message(&file).fields[0].documentation,
        "Test all...\n...the things!"
    );
}

#[test]
fn test_trailing_comment_not_assigned_to_following_field() {
    let proto = "message Test {\n  optional string first_name = 1; // Testing!\n  optional string last_name = 2;\n}";
    let file = parse("test.proto", proto).unwrap();
    let fields = &message(&file).fields;
    assert_eq!(fields[0].documentation, "Testing!");
    assert_eq!(fields[1].documentation, "");
}

#[test]
fn test_enum_value_trailing_comment() {
    let proto = "enum Test {\n  FOO = 1; // Test all the things!\n}";
    let file = parse("test.proto", proto).unwrap();
    assert_eq!(
        enum_type(&file).values[0].documentation,
        "Test all the things!"
    );
}

#[test]
fn test_enum_value_leading_and_trailing_comments_are_combined() {
    let proto = "enum Test {\n  // Test all...\n  FOO = 1; // ...the things!\n}";
    let file = parse("test.proto", proto).unwrap();
    assert_eq!(
        enum_type(&file).values[0].documentation,
        "Test all...\n...the things!"
    );
}

#[test]
fn test_enum_with_doc_blocks_and_line_comments() {
    let proto = r#"
/**
 * What's on my waffles.
 * Also works on pancakes.
 */
enum Topping {
  FRUIT = 1;
  /** Yummy, yummy cream. */
  CREAM = 2;

  // Quebec Maple syrup
  SYRUP = 3;
}
"#;
    let file = parse("waffles.proto", proto).unwrap();
    let topping = enum_type(&file);
    assert_eq!(
        topping.documentation,
        "What's on my waffles.\nAlso works on pancakes."
    );
    assert_eq!(topping.values[0].documentation, "");
    assert_eq!(topping.values[1].documentation, "Yummy, yummy cream.");
    assert_eq!(topping.values[2].documentation, "Quebec Maple syrup");
}

#[test]
fn test_comment_above_message_after_options() {
    let proto = r#"
        package google.protobuf;
        option java_package = "com.google.protobuf";

        // The protocol compiler can output a FileDescriptorSet containing the .proto
        // files it parses.
        message FileDescriptorSet {
        }
    "#;
    let file = parse("descriptor.proto", proto).unwrap();
    assert_eq!(
        message(&file).documentation,
        "The protocol compiler can output a FileDescriptorSet containing the .proto\nfiles it parses."
    );
}

#[test]
fn test_extend_declaration_documentation() {
    let proto = "// Extends Foo\nextend Foo {\n  optional int32 bar = 126;\n}";
    let file = parse("descriptor.proto", proto).unwrap();
    assert_eq!(file.extend_declarations[0].documentation, "Extends Foo");
}

#[test]
fn test_rpc_trailing_comment() {
    let proto = "service S {\n  rpc Ping (Request) returns (Response); // round trip\n}";
    let file = parse("test.proto", proto).unwrap();
    assert_eq!(file.services[0].methods[0].documentation, "round trip");
}

#[test]
fn test_documentation_does_not_leak_into_next_declaration() {
    let proto = "// Only for A\nmessage A {}\nmessage B {}";
    let file = parse("test.proto", proto).unwrap();
    assert_eq!(file.types[0].documentation(), "Only for A");
    assert_eq!(file.types[1].documentation(), "");
}

#[test]
fn test_trailing_comment_on_next_line_goes_to_next_declaration() {
    let proto = "message Test {\n  optional string a = 1;\n  // for b\n  optional string b = 2;\n}";
    let file = parse("test.proto", proto).unwrap();
    let fields = &message(&file).fields;
    assert_eq!(fields[0].documentation, "");
    assert_eq!(fields[1].documentation, "for b");
}

#[test]
fn test_comment_blocks_accumulate_across_blank_lines() {
    let proto = "// first\n\n// second\nmessage Test {}";
    let file = parse("test.proto", proto).unwrap();
    assert_eq!(message(&file).documentation, "first\nsecond");
}
