use std::io::Write;

use docsift_lib::derive_namespace;
use docsift_lib::output::ConsoleIO;

/// Run the `docsift namespace` command.
pub fn run_namespace<OUT, ERR>(file_key: &str, io: &mut dyn ConsoleIO<OUT, ERR>) -> anyhow::Result<()>
where
    OUT: Write,
    ERR: Write,
{
    writeln!(io.stdout(), "{}", derive_namespace(file_key))?;
    Ok(())
}
