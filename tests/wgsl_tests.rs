#[test]
fn quad_shader_parses() {
    let source = include_str!("../src/shaders/quad.wgsl");
    let module = naga::front::wgsl::parse_str(source).unwrap_or_else(|error| {
        panic!("WGSL parse failed for quad.wgsl: {}", error.emit_to_string(source))
    });

    let entry_points: Vec<&str> = module.entry_points.iter().map(|ep| ep.name.as_str()).collect();
    assert!(entry_points.contains(&"vs_main"));
    assert!(entry_points.contains(&"fs_display"));
    assert!(entry_points.contains(&"fs_cursor"));
}

#[test]
fn quad_shader_validates() {
    let source = include_str!("../src/shaders/quad.wgsl");
    let module = naga::front::wgsl::parse_str(source).expect("parse");
    naga::valid::Validator::new(naga::valid::ValidationFlags::all(), naga::valid::Capabilities::empty())
        .validate(&module)
        .expect("quad.wgsl failed validation");
}
