use sdkpack_lib::consts::CONFIG_FILE_NAME;
use sdkpack_lib::platform::{Platform, paths};

use crate::output::print_stat;

pub fn cmd_info() {
  println!("System:");
  match Platform::current() {
    Some(platform) => {
      print_stat("Platform", &platform.triple());
      print_stat("Default profile", platform.profile.as_str());
    }
    None => println!("Could not detect platform."),
  }

  println!();
  println!("Directories:");
  print_stat("Build root", &paths::default_root().display().to_string());
  print_stat("Config", &paths::config_dir().join(CONFIG_FILE_NAME).display().to_string());
}
