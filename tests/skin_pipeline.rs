use std::io::Read;

use skinforge::{
    Canvas, GameType, MarkerKind, NodePath, Orientation, Representation, RepresentationId, Skin,
    scan,
};

fn temp_project(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "skinforge_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

const SKIN_JSON: &str = r#"{
    "author": "someone",
    "version": "1.0.0",
    "skinName": "Neon",
    "skinId": "com.example.neon",
    "system": "com.rileytestut.delta.game.gba"
}"#;

const BATTERY_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="10">
    <rect x="0" y="0" width="20" height="10" fill="#00ff88"/>
</svg>"##;

/// Canvas at logical size 1242x2208: one battery component on a 200x100
/// rectangle at (50,60), one plain `a` element on a 90x90 rectangle at the
/// same origin.
const CANVAS_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="1242" height="2208">
    <g id="layer1">
        <rect x="50" y="60" width="200" height="100" fill="#222222">
            <desc>@component/battery</desc>
        </rect>
        <rect x="50" y="60" width="90" height="90" fill="#444444">
            <desc>@element/a</desc>
        </rect>
    </g>
</svg>"##;

fn write_project(dir: &std::path::Path) {
    std::fs::create_dir_all(dir.join("representations/iphone-e2e")).unwrap();
    std::fs::create_dir_all(dir.join("components")).unwrap();
    std::fs::create_dir_all(dir.join("elements")).unwrap();
    std::fs::write(dir.join("skin.json"), SKIN_JSON).unwrap();
    std::fs::write(dir.join("components/battery.svg"), BATTERY_SVG).unwrap();
    std::fs::write(
        dir.join("representations/iphone-e2e/portrait.svg"),
        CANVAS_SVG,
    )
    .unwrap();
}

fn iphone_e2e_portrait() -> Representation {
    Representation::new(
        RepresentationId::IphoneEdgeToEdge,
        Orientation::Portrait,
        false,
    )
}

#[test]
fn battery_scenario_substitutes_and_maps_to_logical_coordinates() {
    let dir = temp_project("battery_scenario");
    write_project(&dir);

    let canvas = Canvas::create(&dir, iphone_e2e_portrait(), GameType::Gba).unwrap();
    let substituted = canvas.substituted_document();

    // The battery placeholder became an inline image sized to its rectangle.
    let markers = scan(&substituted, MarkerKind::Component);
    assert!(markers.is_empty(), "marker subtree should be replaced");
    let image = substituted
        .element_at(&NodePath::root().child(0).child(0))
        .unwrap();
    assert_eq!(image.name, "image");
    assert_eq!(image.attribute("width"), Some("200"));
    assert_eq!(image.attribute("height"), Some("100"));

    // The element produced one item fragment in logical coordinates (/3).
    let fragment = canvas.config_fragment();
    assert_eq!(fragment.screens.len(), 0);
    assert_eq!(fragment.items.len(), 1);
    assert_eq!(fragment.items[0]["inputs"], serde_json::json!(["a"]));
    assert_eq!(
        fragment.items[0]["frame"],
        serde_json::json!({ "x": 17, "y": 20, "width": 30, "height": 30 })
    );
}

#[test]
fn assemble_packages_raster_and_configuration() {
    let dir = temp_project("assemble");
    write_project(&dir);

    let skin = Skin::load(&dir).unwrap();
    let out = skin
        .assemble(&[iphone_e2e_portrait()], &dir.join("dist"))
        .unwrap();
    assert_eq!(out.file_name().unwrap(), "Neon-1.0.0.deltaskin");

    let file = std::fs::File::open(&out).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    assert_eq!(archive.len(), 2);

    // The raster is rendered at the catalog resolution, upscaled from 2208.
    let mut png = Vec::new();
    archive
        .by_name("iphone-e2e_portrait.png")
        .unwrap()
        .read_to_end(&mut png)
        .unwrap();
    let img = image::load_from_memory(&png).unwrap();
    assert_eq!((img.width(), img.height()), (1242, 2688));

    let mut config = String::new();
    archive
        .by_name("info.json")
        .unwrap()
        .read_to_string(&mut config)
        .unwrap();
    let config: serde_json::Value = serde_json::from_str(&config).unwrap();
    assert_eq!(config["name"], serde_json::json!("Neon"));
    assert_eq!(config["debug"], serde_json::json!(false));
    let leaf = &config["representations"]["iphone"]["edgeToEdge"]["portrait"];
    assert_eq!(
        leaf["assets"]["large"],
        serde_json::json!("iphone-e2e_portrait.png")
    );
    assert_eq!(
        leaf["mappingSize"],
        serde_json::json!({ "width": 414, "height": 896 })
    );
    assert_eq!(leaf["items"][0]["inputs"], serde_json::json!(["a"]));
}

#[test]
fn broken_representation_is_skipped_but_the_run_succeeds() {
    let dir = temp_project("partial");
    write_project(&dir);
    // Second representation with an unparsable canvas.
    std::fs::create_dir_all(dir.join("representations/iphone-standard")).unwrap();
    std::fs::write(
        dir.join("representations/iphone-standard/portrait.svg"),
        "<svg unclosed",
    )
    .unwrap();

    let skin = Skin::load(&dir).unwrap();
    let reps = [
        Representation::new(
            RepresentationId::IphoneStandard,
            Orientation::Portrait,
            false,
        ),
        iphone_e2e_portrait(),
    ];
    let out = skin.assemble(&reps, &dir.join("dist")).unwrap();

    let file = std::fs::File::open(&out).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    assert!(names.contains(&"iphone-e2e_portrait.png".to_string()));
    assert!(!names.contains(&"iphone-standard_portrait.png".to_string()));

    let mut config = String::new();
    archive
        .by_name("info.json")
        .unwrap()
        .read_to_string(&mut config)
        .unwrap();
    let config: serde_json::Value = serde_json::from_str(&config).unwrap();
    assert!(config["representations"]["iphone"]["edgeToEdge"]["portrait"].is_object());
    assert!(config["representations"]["iphone"]["standard"].is_null());
}

#[test]
fn zero_successful_representations_fail_the_run() {
    let dir = temp_project("zero");
    std::fs::write(dir.join("skin.json"), SKIN_JSON).unwrap();

    let skin = Skin::load(&dir).unwrap();
    let err = skin
        .assemble(&[iphone_e2e_portrait()], &dir.join("dist"))
        .unwrap_err();
    assert!(err.to_string().contains("no representation"));
    assert!(!dir.join("dist/Neon-1.0.0.deltaskin").exists());
}
