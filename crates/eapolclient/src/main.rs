mod iface;
mod stub;

use std::collections::HashMap;
use std::time::Duration;

use clap::{App, Arg};

use eapol_support::logging::{self as log_macros, LogConfigSource};
use eapol_transport::{ControlMode, ControlValue, PreauthConfig, SocketSource};

fn parse_mode(raw: &str) -> ControlMode {
    match raw {
        "login" => ControlMode::LoginWindow,
        "system" => ControlMode::System,
        _ => ControlMode::User,
    }
}

pub fn main() {
    let matches = App::new("eapolclient")
        .version("0.1.0")
        .author("Bush Hammer Industries")
        .about("EAPOL transport core for an 802.1X supplicant client.")
        .arg(
            Arg::with_name("INTERFACE")
                .help("Network interface to bind the raw EAPOL socket to")
                .required(true),
        )
        .arg(
            Arg::with_name("mode")
                .long("mode")
                .takes_value(true)
                .possible_values(&["user", "login", "system"])
                .default_value("user")
                .help("Control mode; governs Logoff-on-controller-death behavior"),
        )
        .arg(
            Arg::with_name("config")
                .long("config")
                .takes_value(true)
                .help("Path to a Preauthentication TOML config file"),
        )
        .get_matches();

    let if_name = matches.value_of("INTERFACE").expect("required by clap");
    let mode = parse_mode(matches.value_of("mode").expect("has default"));

    let log = log_macros::init(LogConfigSource::Default);

    let config = match matches.value_of("config") {
        Some(path) => PreauthConfig::load(path).unwrap_or_else(|err| {
            log_macros::warn!(log, "failed to load config, using defaults"; "path" => path, "error" => %err);
            PreauthConfig::default()
        }),
        None => PreauthConfig::default(),
    };

    let ether = iface::local_ether_address(if_name).unwrap_or_else(|err| {
        log_macros::error!(log, "could not determine local MAC address"; "interface" => if_name, "error" => %err);
        std::process::exit(1);
    });
    let is_wireless = iface::is_wireless_interface(if_name);

    log_macros::info!(log, "starting eapolclient";
        "interface" => if_name,
        "ether" => %ether,
        "wireless" => is_wireless,
        "mode" => ?mode);

    let wireless: Option<Box<dyn eapol_transport::WirelessAdapter>> =
        if is_wireless { Some(Box::new(stub::NullWireless)) } else { None };

    let mut source = match SocketSource::create(
        if_name,
        ether,
        mode,
        config,
        Box::new(stub::NullController),
        wireless,
        log.new(log_macros::o!("component" => "source")),
    ) {
        Ok(source) => source,
        Err(err) => {
            log_macros::error!(log, "failed to open raw link socket"; "error" => %err);
            std::process::exit(1);
        }
    };

    let mut initial_dict: HashMap<String, ControlValue> = HashMap::new();
    initial_dict.insert("Configuration".to_owned(), ControlValue::Flag(true));

    let supplicant_log = log.new(log_macros::o!("endpoint" => "(main)"));
    if !source.create_supplicant(&initial_dict, || Box::new(stub::NullSupplicant::new(supplicant_log))) {
        log_macros::error!(log, "failed to create main supplicant");
        std::process::exit(1);
    }

    loop {
        if let Err(err) = source.run_once(Some(Duration::from_millis(200))) {
            log_macros::error!(log, "run loop iteration failed"; "error" => %err);
        }
    }
}
