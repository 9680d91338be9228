use std::path::PathBuf;

use adtrust_install::cli::Args;
use adtrust_install::config::{DEFAULT_CONFIG_PATH, ToolConfig};
use adtrust_install::console::Console;
use adtrust_install::directory::IpaCliBackend;
use adtrust_install::kerberos::KinitAgent;
use adtrust_install::privilege::{ProcessPrivileges, check_privileges};
use adtrust_install::prompt::TerminalPrompt;
use adtrust_install::registry::CommandServiceRegistry;
use adtrust_install::trust::ExternalTrustInstaller;
use adtrust_install::{Collaborators, RunContext, SetupError, run};
use log::error;

fn main() {
    let args = Args::parse_args();

    let config = match args.resolve() {
        Ok(config) => config,
        Err(e) => fail_early(&e),
    };

    // Before touching any file, including the settings file.
    let privileges = ProcessPrivileges;
    if let Err(e) = check_privileges(&privileges) {
        fail_early(&e);
    }

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let tool = match ToolConfig::load(&config_path) {
        Ok(tool) => tool,
        Err(e) => fail_early(&e),
    };

    let mut ctx = RunContext::new(tool.log_file.clone(), config.debug, Console::terminal());

    let mut prompt = TerminalPrompt;
    let mut tickets = KinitAgent::new(tool.kinit_command.clone(), tool.klist_command.clone());
    let mut directory = IpaCliBackend::new(tool.ipa_command.clone());
    let mut installer = ExternalTrustInstaller::new(tool.trust_helper.clone());
    let mut registry = CommandServiceRegistry::new(tool.service_sync_command.clone());

    let mut collaborators = Collaborators {
        privileges: &privileges,
        prompt: &mut prompt,
        tickets: &mut tickets,
        directory: &mut directory,
        installer: &mut installer,
        registry: &mut registry,
    };

    match run(&mut ctx, &config, &tool, &mut collaborators) {
        Ok(_) => std::process::exit(0),
        Err(e) => {
            error!("{e}");
            ctx.console.error(&e.user_message());
            std::process::exit(e.exit_code());
        }
    }
}

/// Report an error raised before logging is set up
fn fail_early(e: &SetupError) -> ! {
    Console::terminal().error(&e.user_message());
    std::process::exit(e.exit_code());
}
