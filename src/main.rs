use clap::{arg,crate_version,ArgAction,ArgMatches,Command};
use statichuff::{shf,reduction_percent,Options,STD_OPTIONS};
use std::time::Instant;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

const RCH: &str = "unreachable was reached";

fn ok_to_overwrite(path_out: &str) -> bool {
    if let Ok(_f) = std::fs::File::open(path_out) {
        let mut ans = String::new();
        eprint!("{} exists, overwrite? (y/n) ",path_out);
        if std::io::stdin().read_line(&mut ans).is_err() {
            log::warn!("could not read stdin");
            return false;
        }
        if ans.trim_end()=="y" || ans.trim_end()=="Y" {
            return true;
        }
        return false;
    }
    true
}

/// options for the library, taken from the subcommand's flags
fn options_from(cmd: &ArgMatches) -> Options {
    let mut opt = STD_OPTIONS;
    opt.header = !cmd.get_flag("bare");
    opt
}

fn main() -> STDRESULT
{
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let long_help =
"Examples:
---------
Compress:      `statichuff compress -i my_text -o my_compressed`
Expand:        `statichuff expand -i my_compressed -o my_text`";

    let mut main_cmd = Command::new("statichuff")
        .about("Compress and expand with static Huffman coding")
        .after_long_help(long_help)
        .version(crate_version!());
    main_cmd = main_cmd.subcommand(Command::new("compress")
        .arg(arg!(-i --input <PATH> "input path").required(true))
        .arg(arg!(-o --output <PATH> "output path").required(true))
        .arg(arg!(--bare "omit the file signature").action(ArgAction::SetTrue))
        .about("compress a file"));

    main_cmd = main_cmd.subcommand(Command::new("expand")
        .arg(arg!(-i --input <PATH> "input path").required(true))
        .arg(arg!(-o --output <PATH> "output path").required(true))
        .arg(arg!(--bare "input has no file signature").action(ArgAction::SetTrue))
        .about("expand a file"));

    let matches = main_cmd.get_matches();

    if let Some(cmd) = matches.subcommand_matches("compress") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let path_out = cmd.get_one::<String>("output").expect(RCH);
        if !ok_to_overwrite(path_out) {
            eprintln!("abort operation");
            return Ok(());
        }
        let opt = options_from(cmd);
        let mut in_file = std::fs::File::open(path_in)?;
        let mut out_file = std::fs::OpenOptions::new().write(true).truncate(false).create(true).open(path_out)?;
        let start = Instant::now();
        let (in_size,out_size) = shf::compress(&mut in_file,&mut out_file,&opt)?;
        let elapsed = start.elapsed();
        out_file.set_len(out_size)?;
        eprintln!("compressed {} into {}",in_size,out_size);
        eprintln!("size reduced {}%",reduction_percent(in_size,out_size));
        eprintln!("time to compress {} ms",elapsed.as_millis());
    }

    if let Some(cmd) = matches.subcommand_matches("expand") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let path_out = cmd.get_one::<String>("output").expect(RCH);
        if !ok_to_overwrite(path_out) {
            eprintln!("abort operation");
            return Ok(());
        }
        let opt = options_from(cmd);
        let mut in_file = std::fs::File::open(path_in)?;
        let mut out_file = std::fs::OpenOptions::new().write(true).truncate(false).create(true).open(path_out)?;
        let start = Instant::now();
        let (in_size,out_size) = shf::expand(&mut in_file,&mut out_file,&opt)?;
        let elapsed = start.elapsed();
        out_file.set_len(out_size)?;
        eprintln!("expanded {} into {}",in_size,out_size);
        eprintln!("time to expand {} ms",elapsed.as_millis());
    }

    Ok(())
}
