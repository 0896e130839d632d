use anyhow::Result;
use cc_tool::args::{self, Arg, Command};
use cc_tool::config::Config;
use cc_tool::format::FixedFormatter;
use cc_tool::image::{script_image_path, FatImage, ImageWriter};
use cc_tool::output_scripts::txt::{TxtDumper, TxtParser};
use cc_tool::scripts::cc::container;
use cc_tool::scripts::cc::script::CcScript;
use cc_tool::types::*;
use cc_tool::utils::files;
use cc_tool::COUNTER;
use std::path::Path;

fn output_path(dir: &str, input: &Path) -> Result<std::path::PathBuf> {
    let name = input
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("No file name in {}", input.display()))?;
    Ok(Path::new(dir).join(name))
}

fn txt_path(dir: &str, input: &Path) -> Result<std::path::PathBuf> {
    let stem = input
        .file_stem()
        .ok_or_else(|| anyhow::anyhow!("No file name in {}", input.display()))?;
    let mut path = Path::new(dir).join(stem);
    path.set_extension("txt");
    Ok(path)
}

fn decompress_file(input: &Path, out_dir: &str) -> Result<ScriptResult> {
    let raw = files::read_file(input)?;
    let script = container::unframe(&raw)?;
    files::write_file(&output_path(out_dir, input)?, &script)?;
    Ok(ScriptResult::Ok)
}

fn compress_file(input: &Path, out_dir: &str) -> Result<ScriptResult> {
    let script = files::read_file(input)?;
    let raw = container::frame(&script)?;
    files::write_file(&output_path(out_dir, input)?, &raw)?;
    Ok(ScriptResult::Ok)
}

fn extract_file(input: &Path, out_dir: &str) -> Result<ScriptResult> {
    let data = files::read_file(input)?;
    let script = CcScript::new(data, Encoding::Cp932)?;
    let messages = script.extract_messages();
    if messages.is_empty() {
        eprintln!("No text records found");
        return Ok(ScriptResult::Ignored);
    }
    let text = TxtDumper::dump(&messages);
    files::write_file(&txt_path(out_dir, input)?, text.as_bytes())?;
    Ok(ScriptResult::Ok)
}

fn inject_file(
    input: &Path,
    txt_dir: &str,
    out_dir: &str,
    formatter: &FixedFormatter,
) -> Result<ScriptResult> {
    let txt = txt_path(txt_dir, input)?;
    if !txt.is_file() {
        // No translation yet for this script.
        return Ok(ScriptResult::Ignored);
    }
    let data = files::read_file(input)?;
    let script = CcScript::new(data, Encoding::Cp932)?;
    let text = String::from_utf8(files::read_file(&txt)?)
        .map_err(|_| anyhow::anyhow!("{} is not valid UTF-8", txt.display()))?;
    let replacements = TxtParser::new(&text).parse();
    let injected = script.import_messages(&replacements, formatter)?;
    files::write_file(&output_path(out_dir, input)?, &injected.data)?;
    let report = injected.report;
    if report.is_partial() {
        eprintln!(
            "Warning: kept original text for {} oversize and {} over-budget records ({} bytes over)",
            report.skipped_oversize, report.skipped_budget, report.overflow
        );
        COUNTER.inc_warning();
        return Ok(ScriptResult::Partial);
    }
    Ok(ScriptResult::Ok)
}

fn run_dir<F>(dir: &str, arg: &Arg, verb: &str, f: F) -> Result<()>
where
    F: Fn(&Path) -> Result<ScriptResult>,
{
    let inputs = files::collect_dir_files(dir)?;
    for input in inputs.iter() {
        eprintln!("{} {}", verb, input.display());
        match f(input) {
            Ok(result) => COUNTER.inc(result),
            Err(e) => {
                eprintln!("Error: {}: {}", input.display(), e);
                if arg.backtrace {
                    eprintln!("Backtrace: {:?}", e.backtrace());
                }
                COUNTER.inc_error();
            }
        }
    }
    Ok(())
}

fn import_batch(cfg: &Config, arg: &Arg) -> Result<()> {
    let inputs = files::collect_dir_files(&cfg.en_cc)?;
    let mut image = FatImage::open(&cfg.hdi_file)?;
    for input in inputs.iter() {
        eprintln!("Importing {}", input.display());
        let result = (|| -> Result<ScriptResult> {
            let name = input
                .file_name()
                .ok_or_else(|| anyhow::anyhow!("No file name in {}", input.display()))?;
            let data = files::read_file(input)?;
            image.replace_file(&script_image_path(&name.to_string_lossy()), &data)?;
            Ok(ScriptResult::Ok)
        })();
        match result {
            Ok(result) => COUNTER.inc(result),
            Err(e) => {
                eprintln!("Error: {}: {}", input.display(), e);
                if arg.backtrace {
                    eprintln!("Backtrace: {:?}", e.backtrace());
                }
                COUNTER.inc_error();
            }
        }
    }
    image.close()?;
    Ok(())
}

fn run(arg: &Arg, cfg: &Config) -> Result<()> {
    let formatter = FixedFormatter::new(arg.wrap_width);
    match &arg.command {
        Command::Decompress => run_dir(&cfg.jp_cc, arg, "Decompressing", |p| {
            decompress_file(p, &cfg.decompress_jp_cc)
        }),
        Command::Compress => run_dir(&cfg.decompress_en_cc, arg, "Compressing", |p| {
            compress_file(p, &cfg.en_cc)
        }),
        Command::Extract => run_dir(&cfg.decompress_jp_cc, arg, "Extracting", |p| {
            extract_file(p, &cfg.jp_txt)
        }),
        Command::Inject => run_dir(&cfg.decompress_jp_cc, arg, "Injecting", |p| {
            inject_file(p, &cfg.en_txt, &cfg.decompress_en_cc, &formatter)
        }),
        Command::Import => import_batch(cfg, arg),
        Command::All => {
            run_dir(&cfg.decompress_jp_cc, arg, "Injecting", |p| {
                inject_file(p, &cfg.en_txt, &cfg.decompress_en_cc, &formatter)
            })?;
            run_dir(&cfg.decompress_en_cc, arg, "Compressing", |p| {
                compress_file(p, &cfg.en_cc)
            })?;
            import_batch(cfg, arg)
        }
    }
}

fn main() {
    let arg = args::parse_args();
    if arg.backtrace {
        unsafe { std::env::set_var("RUST_LIB_BACKTRACE", "1") };
    }
    let cfg = match Config::load(&arg.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = run(&arg, &cfg) {
        eprintln!("Error: {}", e);
        COUNTER.inc_error();
    }
    eprintln!("{}", *COUNTER);
    if COUNTER.errors() > 0 {
        std::process::exit(1);
    }
}
