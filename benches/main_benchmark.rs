use criterion::{Criterion, criterion_group, criterion_main};
use kiln::build::{BuildGroup, TemplateVars, is_up_to_date, parse_config, render};
use std::collections::BTreeMap;
use std::fs;
use std::hint::black_box;
use std::path::PathBuf;

const MOCK_MANIFEST: &str = r#"
[vars]
cflags = "-O2 -Wall"

[watch]
root = "src"
extensions = ["c", ".H"]

[[group]]
name = "core"
sources = ["src/a.c", "src/b.c", "src/c.c"]
out_dir = "build/core"
compile = "cc {cflags} -c {src} -o {out}"
archive = "ar rcs {lib} {objs}"
lib = "build/libcore.a"

[link]
command = "cc {libs} {objects} -o {exe}"
exe = "bin/app"
"#;

fn bench_manifest_parse(c: &mut Criterion) {
    c.bench_function("parse_kiln_toml", |b| {
        b.iter(|| parse_config(black_box(MOCK_MANIFEST)).unwrap())
    });
}

fn bench_render(c: &mut Criterion) {
    let user: BTreeMap<String, String> =
        [("cflags".to_string(), "-O2 -Wall -Wextra".to_string())].into();
    let objs: Vec<PathBuf> = (0..64)
        .map(|i| PathBuf::from(format!("build/core/unit_{i}.c.o")))
        .collect();
    let vars = TemplateVars::new(&user)
        .paths("objs", &objs)
        .path("lib", &PathBuf::from("build/libcore.a"));

    c.bench_function("render_archive_template", |b| {
        b.iter(|| render(black_box("ar rcs {lib} {objs} {cflags} {unknown}"), &vars))
    });
}

/// The no-op pass is dominated by one metadata pair per unit.
fn bench_up_to_date_scan(c: &mut Criterion) {
    let temp_dir = std::env::temp_dir().join("kiln_bench_scan");
    let _ = fs::remove_dir_all(&temp_dir);
    let src_dir = temp_dir.join("src");
    let out_dir = temp_dir.join("build");
    fs::create_dir_all(&src_dir).unwrap();
    fs::create_dir_all(&out_dir).unwrap();

    let sources: Vec<String> = (0..200)
        .map(|i| {
            let path = src_dir.join(format!("unit_{i}.c"));
            fs::write(&path, "int x;").unwrap();
            format!("\"{}\"", path.display().to_string().replace('\\', "/"))
        })
        .collect();
    let manifest = format!(
        r#"
[[group]]
name = "bench"
sources = [{}]
out_dir = "{}"
compile = "true"
archive = "true"
lib = "{}"

[link]
command = "true"
exe = "app"
"#,
        sources.join(", "),
        out_dir.display().to_string().replace('\\', "/"),
        temp_dir.join("libbench.a").display().to_string().replace('\\', "/"),
    );
    let config = parse_config(&manifest).unwrap();
    let group = BuildGroup::from(&config.groups[0]);
    let outputs = group.outputs();
    for out in &outputs {
        fs::write(out, "").unwrap();
    }

    c.bench_function("stale_units_200", |b| {
        b.iter(|| black_box(group.stale_units().len()))
    });

    let (src, out) = (&group.units[0].path, &outputs[0]);
    c.bench_function("is_up_to_date_single", |b| {
        b.iter(|| is_up_to_date(black_box(src), black_box(out)))
    });

    let _ = fs::remove_dir_all(&temp_dir);
}

criterion_group!(benches, bench_manifest_parse, bench_render, bench_up_to_date_scan);
criterion_main!(benches);
