#[test]
fn weld_error_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/weld_error_pass.rs");
    t.pass("tests/ui/weld_error_context_accessor.rs");
    t.compile_fail("tests/ui/weld_error_no_context.rs");
    t.compile_fail("tests/ui/weld_error_bad_context_type.rs");
    t.compile_fail("tests/ui/weld_error_tuple_variant.rs");
}
