mod cli;

use renv::definition::{Definition, LoadError};
use renv::emit::Format;
use renv::environment::{EmptyEnvironment, Environment, ProcessEnvironment};
use renv::graph::DependencyGraph;

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("RENV_LOG"))
        .with_writer(std::io::stderr)
        .init();

    for new_path in cli.directory.iter() {
        match new_path.canonicalize() {
            Err(e) => {
                eprintln!(
                    "Failed to resolve path for -C/--directory {}\n{}",
                    new_path.display(),
                    e
                );
                std::process::exit(1);
            }
            Ok(cwd) => {
                if let Err(err) = std::env::set_current_dir(&cwd) {
                    eprintln!("Failed to set work directory to {}\n{}", cwd.display(), err,);
                    std::process::exit(1);
                }

                tracing::info!(directory=%cwd.display(), "Changed working directory");
            }
        }
    }

    let command_result = match cli.command {
        cli::Command::Render(render_cli) => render(render_cli),
        cli::Command::Run(run_cli) => run(run_cli),
        cli::Command::Dev(dev_cli) => dev(dev_cli),
    };

    match command_result {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            print_error(&e);
            std::process::exit(1);
        }
    }
}

fn print_error(e: &anyhow::Error) {
    for error in e.chain() {
        eprintln!("{error}")
    }
}

/// Resolves every source on its own. A failing source does not stop the others.
pub fn render(cli: cli::RenderCommand) -> anyhow::Result<i32> {
    let definitions = load(&cli.input)?;
    let options = cli.resolve.options();
    let environment = environment(&cli.resolve);
    let format: Format = cli.output.format.into();

    let mut exit_code = 0;
    let mut emitted = false;
    let mut stdout = std::io::stdout().lock();
    for definition in definitions {
        let definition = match definition {
            Ok(definition) => definition,
            Err(e) => {
                print_error(&anyhow::Error::new(e));
                exit_code = 1;
                continue;
            }
        };

        let resolved =
            match renv::resolve::resolve_with(&definition.variables, environment, options) {
                Ok(resolved) => resolved,
                Err(e) => {
                    eprintln!("{}", definition.source_name());
                    print_error(&anyhow::Error::new(e));
                    exit_code = 1;
                    continue;
                }
            };

        if emitted && format.is_line_oriented() {
            use std::io::Write;
            writeln!(stdout)?;
        }

        renv::emit::emit(&mut stdout, &resolved, format)?;
        emitted = true;
    }

    Ok(exit_code)
}

/// Runs a command with the resolved variables added to its environment
pub fn run(cli: cli::RunCommand) -> anyhow::Result<i32> {
    let definition = Definition::load_file(&cli.file)?;
    let resolved = renv::resolve::resolve_with(
        &definition.variables,
        environment(&cli.resolve),
        cli.resolve.options(),
    )
    .map_err(|e| anyhow::Error::new(e).context(definition.source_name()))?;

    let Some((program, args)) = cli.command.split_first() else {
        anyhow::bail!("No command given");
    };

    let mut command = std::process::Command::new(program);
    command.args(args);
    if cli.resolve.ignore_environment {
        command.env_clear();
    }
    command.envs(&resolved);

    tracing::debug!(?command, "running");
    let status = command
        .status()
        .map_err(|e| anyhow::anyhow!("Failed to run {}: {e}", program.to_string_lossy()))?;

    // killed by a signal: no code
    Ok(status.code().unwrap_or(1))
}

fn environment(args: &cli::ResolveArgs) -> &'static dyn Environment {
    if args.ignore_environment {
        &EmptyEnvironment
    } else {
        &ProcessEnvironment
    }
}

/// Every source is loaded on its own, a broken source does not hide the others
fn load(input: &cli::InputArgs) -> anyhow::Result<Vec<Result<Definition, LoadError>>> {
    if !input.workdir && input.files.is_empty() && input.directories.is_empty() {
        let stdin = std::io::read_to_string(std::io::stdin())?;
        return Ok(vec![Definition::from_yaml(&stdin, None)]);
    }

    let mut definitions = vec![];

    if input.workdir {
        extend(&mut definitions, Definition::load_directory(&std::env::current_dir()?));
    }

    for file_path in &input.files {
        definitions.push(Definition::load_file(file_path));
    }

    for dir_path in &input.directories {
        extend(&mut definitions, Definition::load_directory(dir_path));
    }

    anyhow::ensure!(!definitions.is_empty(), "No files loaded");

    Ok(definitions)
}

fn extend(
    definitions: &mut Vec<Result<Definition, LoadError>>,
    directory: Result<Vec<Definition>, LoadError>,
) {
    match directory {
        Ok(loaded) => definitions.extend(loaded.into_iter().map(Ok)),
        Err(e) => definitions.push(Err(e)),
    }
}

/// (renv-)developer utilities
///
/// A quick way to expose internal structures for debugging purposes.
/// Broken sources are reported like in [render] and do not stop the others.
pub fn dev(cli: cli::DevCommand) -> anyhow::Result<i32> {
    use cli::DevSubCommand::*;

    let mut exit_code = 0;
    for definition in load(&cli.input)? {
        let definition = match definition {
            Ok(definition) => definition,
            Err(e) => {
                print_error(&anyhow::Error::new(e));
                exit_code = 1;
                continue;
            }
        };

        let graph = DependencyGraph::build(&definition.variables);
        println!("# {}", definition.source_name());

        match cli.command {
            Graph => {
                for name in graph.names() {
                    let dependencies: Vec<&str> = graph.dependencies(name).collect();
                    println!("{name} -> [{}]", dependencies.join(", "));
                }
            }
            Order => match graph.order() {
                Ok(order) => {
                    for name in order {
                        println!("{name}");
                    }
                }
                Err(e) => {
                    eprintln!("{}", definition.source_name());
                    print_error(&anyhow::Error::new(e));
                    exit_code = 1;
                }
            },
        }
    }

    Ok(exit_code)
}
