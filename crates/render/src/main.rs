//! Generate an insole model and write one binary STL per part, plus an SVG
//! preview of the whole scene.
//!
//! Usage: `insole-render [--params FILE] [--config FILE] [--scan FILE.stl]
//! [--preview] [--out DIR]`

mod svg;

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use insole_designer::{AnthropometricParams, GeometryConfig, InsoleModel, fit_params_to_scan, generate, load_scan};
use insole_file_format::encode_binary;
use insole_tessellation::TriangleMesh;

#[derive(Debug, Default)]
struct Args {
    params: Option<PathBuf>,
    config: Option<PathBuf>,
    scan: Option<PathBuf>,
    preview: bool,
    fit: bool,
    out: Option<PathBuf>,
}

fn parse_args(mut raw: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut args = Args::default();
    while let Some(flag) = raw.next() {
        let mut value = || raw.next().map(PathBuf::from).ok_or(format!("{flag} needs a value"));
        match flag.as_str() {
            "--params" => args.params = Some(value()?),
            "--config" => args.config = Some(value()?),
            "--scan" => args.scan = Some(value()?),
            "--out" => args.out = Some(value()?),
            "--preview" => args.preview = true,
            "--fit" => args.fit = true,
            other => return Err(format!("unknown argument: {other}")),
        }
    }
    Ok(args)
}

fn part_color(name: &str) -> (f64, f64, f64) {
    match name {
        "layer_base" => (0.35, 0.55, 0.85),
        "layer_support" => (0.45, 0.75, 0.55),
        "layer_cushion" => (0.85, 0.75, 0.45),
        "support_grid" => (0.6, 0.6, 0.6),
        "foot_preview" | "scan" => (0.9, 0.7, 0.6),
        _ => (0.85, 0.45, 0.4),
    }
}

fn report(model: &InsoleModel, parts: &[(String, TriangleMesh)]) {
    let p = &model.params;
    println!(
        "=== Insole {}x{} mm, heel {} mm, arch {} mm ({:?}) ===",
        p.foot_length, p.foot_width, p.heel_width, p.arch_height, p.arch_support_level
    );
    println!("  stack height: {:.1} mm", model.stack_height * 1000.0);
    for (name, mesh) in parts {
        let bb = mesh.bounding_box();
        println!(
            "  {name}: {tris} tris, {verts} verts, y {lo:.1}..{hi:.1} mm",
            tris = mesh.triangle_count(),
            verts = mesh.vertex_count(),
            lo = bb.min.y * 1000.0,
            hi = bb.max.y * 1000.0,
        );
    }
    if let Some(scan) = &model.scan {
        println!(
            "  scan: dominant axis {}, scale {:.3}",
            scan.transform.dominant_axis, scan.transform.scale
        );
    }
}

fn write_parts(out: &Path, parts: &[(String, TriangleMesh)]) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(out)?;
    for (name, mesh) in parts {
        fs::write(out.join(format!("{name}.stl")), encode_binary(mesh, name))?;
    }
    let colored: Vec<(&TriangleMesh, (f64, f64, f64))> =
        parts.iter().map(|(name, mesh)| (mesh, part_color(name))).collect();
    fs::write(
        out.join("insole.svg"),
        svg::scene_to_svg(&colored, 800.0, 600.0, "Insole"),
    )?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = parse_args(std::env::args().skip(1))?;

    let mut params = match &args.params {
        Some(path) => AnthropometricParams::from_json_str(&fs::read_to_string(path)?)?,
        None => AnthropometricParams::default(),
    };
    let config = match (&args.config, args.preview) {
        (Some(path), _) => GeometryConfig::from_json_str(&fs::read_to_string(path)?)?,
        (None, true) => GeometryConfig::preview(),
        (None, false) => GeometryConfig::default(),
    };
    let scan = match &args.scan {
        Some(path) => Some(load_scan(&fs::read(path)?)?),
        None => None,
    };

    let mut model = generate(&params, &config, scan.as_ref())?;
    if args.fit {
        if let Some(aligned) = &model.scan {
            params = fit_params_to_scan(&params, &aligned.mesh)?;
            model = generate(&params, &config, scan.as_ref())?;
        }
    }

    let parts = model.scene_meshes();
    report(&model, &parts);
    let out = args.out.unwrap_or_else(|| PathBuf::from("docs/exports"));
    write_parts(&out, &parts)?;
    println!("wrote {} parts to {}", parts.len(), out.display());
    Ok(())
}
