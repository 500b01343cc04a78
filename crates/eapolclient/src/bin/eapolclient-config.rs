//! Prints the default `Preauthentication` configuration as TOML, the way
//! `gamerunner_config` prints a fresh `GameConfig`.

use eapol_transport::PreauthConfig;

fn main() {
    let toml = serdeconv::to_toml_string(&PreauthConfig::default())
        .expect("failed to serialize default configuration");
    println!("{}", toml);
}
