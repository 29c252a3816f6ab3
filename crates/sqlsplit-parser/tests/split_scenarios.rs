use indoc::indoc;
use pretty_assertions::assert_eq;

use sqlsplit_parser::{
    split_script, Dialect, DialectDescriptor, ElementKind, ScriptElement, ScriptSplitter,
    TextDocument,
};

fn texts(elements: &[ScriptElement]) -> Vec<&str> {
    elements.iter().map(|e| e.text()).collect()
}

#[test]
fn splits_plain_statements() {
    let elements = split_script("SELECT 1; SELECT 2", Dialect::Generic);
    assert_eq!(texts(&elements), vec!["SELECT 1", "SELECT 2"]);
    assert!(elements.iter().all(|e| e.kind() == ElementKind::Statement));
}

#[test]
fn suppresses_empty_statements() {
    let elements = split_script(";;;SELECT 1;", Dialect::Generic);
    assert_eq!(texts(&elements), vec!["SELECT 1"]);

    assert!(split_script("", Dialect::Generic).is_empty());
    assert!(split_script("   \n\t  ", Dialect::Generic).is_empty());
    assert!(split_script(";;;;", Dialect::Generic).is_empty());
}

#[test]
fn escaped_quote_does_not_end_the_string() {
    let elements = split_script("SELECT 'it''s; a test'; SELECT 2", Dialect::Generic);
    assert_eq!(texts(&elements), vec!["SELECT 'it''s; a test'", "SELECT 2"]);
}

#[test]
fn delimiters_in_comments_are_ignored() {
    let source = indoc! {"
        SELECT a -- not here; really
        FROM t; /* nor; here */
        SELECT b;
    "};
    let elements = split_script(source, Dialect::Generic);
    assert_eq!(
        texts(&elements),
        vec!["SELECT a -- not here; really\nFROM t", "SELECT b"]
    );
}

#[test]
fn tagged_block_hides_delimiters_and_blank_line_ends_it() {
    let source = "do $a$\n\nbegin\n\traise notice 'hello';\nend\n\n$a$\n\ndummy";
    let elements = split_script(source, Dialect::Postgres);
    assert_eq!(
        texts(&elements),
        vec![
            "do $a$\n\nbegin\n\traise notice 'hello';\nend\n\n$a$",
            "dummy"
        ]
    );
}

#[test]
fn tagged_block_statement_with_trailing_clause_stays_whole() {
    let source = indoc! {"
        CREATE FUNCTION f() RETURNS int AS $body$
        BEGIN
            RETURN 1;
        END;
        $body$ LANGUAGE plpgsql;
        SELECT f();
    "};
    let elements = split_script(source, Dialect::Postgres);
    assert_eq!(elements.len(), 2);
    assert!(elements[0].text().ends_with("LANGUAGE plpgsql"));
    assert_eq!(elements[1].text(), "SELECT f()");
}

#[test]
fn nested_blocks_split_only_at_top_level() {
    let source = indoc! {"
        BEGIN
            BEGIN
                NULL;
            END;
        END;
        SELECT 1;
    "};
    let elements = split_script(source, Dialect::Oracle);
    assert_eq!(elements.len(), 2);
    assert!(elements[0].text().starts_with("BEGIN"));
    assert!(elements[0].text().ends_with("END"));
    assert_eq!(elements[1].text(), "SELECT 1");
}

#[test]
fn declare_block_with_two_word_closers() {
    let source = indoc! {"
        DECLARE
            v INT := 0;
        BEGIN
            IF v = 0 THEN
                v := 1;
            END IF;
            CASE v WHEN 1 THEN NULL; END CASE;
            LOOP
                EXIT;
            END LOOP;
        END;
        SELECT v;
    "};
    let elements = split_script(source, Dialect::Oracle);
    assert_eq!(elements.len(), 2);
    assert!(elements[0].text().starts_with("DECLARE"));
    assert_eq!(elements[1].text(), "SELECT v");
}

#[test]
fn postgres_if_exists_ddl_splits() {
    let elements = split_script("DROP TABLE IF EXISTS t; SELECT 1;", Dialect::Postgres);
    assert_eq!(texts(&elements), vec!["DROP TABLE IF EXISTS t", "SELECT 1"]);

    let elements = split_script(
        "CREATE INDEX IF NOT EXISTS i ON t (a); SELECT 2;",
        Dialect::Postgres,
    );
    assert_eq!(elements.len(), 2);
}

#[test]
fn postgres_declare_cursor_splits() {
    let elements = split_script(
        "DECLARE c CURSOR FOR SELECT 1; FETCH ALL FROM c;",
        Dialect::Postgres,
    );
    assert_eq!(
        texts(&elements),
        vec!["DECLARE c CURSOR FOR SELECT 1", "FETCH ALL FROM c"]
    );
}

#[test]
fn postgres_begin_transaction_splits() {
    let source = "BEGIN TRANSACTION; UPDATE t SET x = 1; COMMIT;";
    let elements = split_script(source, Dialect::Postgres);
    assert_eq!(
        texts(&elements),
        vec!["BEGIN TRANSACTION", "UPDATE t SET x = 1", "COMMIT"]
    );

    let elements = split_script("BEGIN ISOLATION LEVEL SERIALIZABLE; COMMIT;", Dialect::Postgres);
    assert_eq!(elements.len(), 2);
}

#[test]
fn postgres_begin_atomic_body_stays_whole() {
    let source =
        "CREATE FUNCTION add(a int, b int) RETURNS int BEGIN ATOMIC SELECT a + b; END; SELECT 1;";
    let elements = split_script(source, Dialect::Postgres);
    assert_eq!(elements.len(), 2);
    assert!(elements[0].text().ends_with("END"));
    assert_eq!(elements[1].text(), "SELECT 1");
}

#[test]
fn block_keywords_inside_strings_do_not_count() {
    let elements = split_script(
        "SELECT 'BEGIN' AS a; SELECT 'END' AS b;",
        Dialect::Oracle,
    );
    assert_eq!(elements.len(), 2);
}

#[test]
fn begin_transaction_is_a_plain_statement() {
    let source = "BEGIN TRANSACTION; UPDATE t SET x = 1; COMMIT;";
    let elements = split_script(source, Dialect::SqlServer);
    assert_eq!(
        texts(&elements),
        vec!["BEGIN TRANSACTION", "UPDATE t SET x = 1", "COMMIT"]
    );
}

#[test]
fn go_separates_batches() {
    let source = indoc! {"
        SELECT 1
        GO
        SELECT 2
        go 3
    "};
    let elements = split_script(source, Dialect::SqlServer);
    assert_eq!(texts(&elements), vec!["SELECT 1", "GO", "SELECT 2", "go 3"]);
    assert_eq!(elements[1].kind(), ElementKind::ControlCommand);
    assert_eq!(elements[3].kind(), ElementKind::ControlCommand);
}

#[test]
fn go_as_identifier_is_not_a_command() {
    let elements = split_script("SELECT go FROM walks;", Dialect::SqlServer);
    assert_eq!(texts(&elements), vec!["SELECT go FROM walks"]);
}

#[test]
fn slash_runs_the_preceding_oracle_block() {
    let source = indoc! {"
        BEGIN
            NULL;
        END;
        /
        SELECT 1;
    "};
    let elements = split_script(source, Dialect::Oracle);
    assert_eq!(elements.len(), 3);
    assert_eq!(elements[1].text(), "/");
    assert_eq!(elements[1].kind(), ElementKind::ControlCommand);
}

#[test]
fn slash_with_trailing_content_is_not_a_command() {
    // A continuation line that happens to start with division stays SQL.
    let source = "SELECT 1\n/ 2;\nSELECT 3;";
    let elements = split_script(source, Dialect::Oracle);
    assert_eq!(texts(&elements), vec!["SELECT 1\n/ 2", "SELECT 3"]);
    assert!(elements.iter().all(|e| e.kind() == ElementKind::Statement));
}

#[test]
fn backslash_command_is_passed_through() {
    let source = "\\timing on\nSELECT 1;";
    let elements = split_script(source, Dialect::Postgres);
    assert_eq!(texts(&elements), vec!["\\timing on", "SELECT 1"]);
    assert_eq!(elements[0].kind(), ElementKind::ControlCommand);
}

#[test]
fn mysql_backslash_escapes_and_hash_comments() {
    let source = "SELECT 'a\\'; b'; # c; d\nSELECT `x;y` FROM t;";
    let elements = split_script(source, Dialect::MySql);
    assert_eq!(
        texts(&elements),
        vec!["SELECT 'a\\'; b'", "SELECT `x;y` FROM t"]
    );
}

#[test]
fn mysql_hash_comment_touching_a_word_hides_its_delimiter() {
    let source = "SELECT a#hidden ; not a boundary\nFROM t; SELECT 2;";
    let elements = split_script(source, Dialect::MySql);
    assert_eq!(
        texts(&elements),
        vec!["SELECT a#hidden ; not a boundary\nFROM t", "SELECT 2"]
    );
}

#[test]
fn unterminated_string_runs_to_end_of_input() {
    let elements = split_script("SELECT 1; SELECT 'oops; no close", Dialect::Generic);
    assert_eq!(
        texts(&elements),
        vec!["SELECT 1", "SELECT 'oops; no close"]
    );
}

#[test]
fn unterminated_block_keeps_the_tail_whole() {
    let elements = split_script("BEGIN SELECT 1; SELECT 2;", Dialect::Oracle);
    assert_eq!(texts(&elements), vec!["BEGIN SELECT 1; SELECT 2;"]);
}

#[test]
fn last_statement_without_delimiter_is_kept() {
    let elements = split_script("SELECT 1", Dialect::Generic);
    assert_eq!(texts(&elements), vec!["SELECT 1"]);
}

#[test]
fn spans_cover_source_in_order_without_overlap() {
    let source = indoc! {"
        -- header comment
        SELECT 'a;b' FROM t;

        BEGIN
            NULL;
        END;
        SELECT 2
    "};
    let elements = split_script(source, Dialect::Oracle);
    assert_eq!(elements.len(), 3);

    let mut last_end = 0;
    for element in &elements {
        assert!(element.start_offset() >= last_end, "elements out of order");
        assert!(element.start_offset() < element.end_offset());
        assert_eq!(
            &source[element.start_offset()..element.end_offset()],
            element.text(),
            "span must cover exactly the element text"
        );
        last_end = element.end_offset();
    }
    assert!(last_end <= source.len());
}

#[test]
fn custom_descriptor_with_custom_delimiter() {
    let descriptor = DialectDescriptor::builder()
        .delimiter('|')
        .quote(sqlsplit_parser::dialect::QuotePair::string(
            '\'',
            '\'',
            sqlsplit_parser::dialect::EscapeStyle::Doubling,
        ))
        .build()
        .unwrap();
    let splitter = ScriptSplitter::new(&descriptor);
    let elements = splitter.split(&TextDocument::new("a | 'b|c' | d"));
    assert_eq!(texts(&elements), vec!["a", "'b|c'", "d"]);
}

#[test]
fn invalid_descriptor_is_rejected_at_build_time() {
    let err = DialectDescriptor::builder()
        .quote(sqlsplit_parser::dialect::QuotePair::string(
            ';',
            ';',
            sqlsplit_parser::dialect::EscapeStyle::None,
        ))
        .build()
        .unwrap_err();
    assert_eq!(err.kind(), sqlsplit_parser::SplitErrorKind::Configuration);
}
