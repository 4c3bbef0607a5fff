//! Script bodies for each flavor, variant and operation

use std::path::Path;

use crate::script::{LinkOperation, ScriptFlavor, ScriptVariant};

const RULE: &str = "=====================================";

/// Locations a script body refers to
pub struct ScriptContext<'a> {
    pub web_root: &'a Path,
    pub destination: &'a Path,
    /// Public URL of the link, shown after an interactive create
    pub url: &'a str,
}

/// Renders the full script text
pub fn render(
    flavor: ScriptFlavor,
    variant: ScriptVariant,
    operation: &LinkOperation,
    ctx: &ScriptContext<'_>,
) -> String {
    match flavor {
        ScriptFlavor::Batch => {
            let lines = match (variant, operation) {
                (ScriptVariant::Quick, LinkOperation::Create { name, target }) => {
                    batch_quick(ctx, &format!(
                        "mklink /D {} {} >nul 2>&1",
                        batch_quote(name.as_str()),
                        batch_quote(&target.to_string_lossy())
                    ))
                }
                (ScriptVariant::Quick, LinkOperation::Remove { name }) => {
                    batch_quick(ctx, &format!("rmdir {} >nul 2>&1", batch_quote(name.as_str())))
                }
                (ScriptVariant::Interactive, LinkOperation::Create { name, target }) => {
                    batch_interactive_create(ctx, name.as_str(), target)
                }
                (ScriptVariant::Interactive, LinkOperation::Remove { name }) => {
                    batch_interactive_remove(ctx, name.as_str())
                }
            };
            let mut text = lines.join("\r\n");
            text.push_str("\r\n");
            text
        }
        ScriptFlavor::Shell => {
            let lines = match (variant, operation) {
                (ScriptVariant::Quick, LinkOperation::Create { target, .. }) => {
                    shell_quick_create(ctx, target)
                }
                (ScriptVariant::Quick, LinkOperation::Remove { .. }) => shell_quick_remove(ctx),
                (ScriptVariant::Interactive, LinkOperation::Create { name, target }) => {
                    shell_interactive_create(ctx, name.as_str(), target)
                }
                (ScriptVariant::Interactive, LinkOperation::Remove { name }) => {
                    shell_interactive_remove(ctx, name.as_str())
                }
            };
            let mut text = lines.join("\n");
            text.push('\n');
            text
        }
    }
}

/// Single-quotes a value for `sh`
pub fn sh_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

fn sh_echo(text: &str) -> String {
    format!("printf '%s\\n' {}", sh_quote(text))
}

fn batch_echo(text: &str) -> String {
    if text.is_empty() {
        "echo.".to_string()
    } else {
        format!("echo {}", batch_escape(text))
    }
}

/// Caret-escapes what `cmd` would read as operators in unquoted text
fn batch_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '^' | '&' | '|' | '<' | '>' | '(' | ')' => {
                escaped.push('^');
                escaped.push(c);
            }
            '%' => escaped.push_str("%%"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Double-quotes a path for `cmd`; `%` still expands inside quotes
fn batch_quote(text: &str) -> String {
    format!("\"{}\"", text.replace('%', "%%"))
}

fn batch_quick(ctx: &ScriptContext<'_>, action: &str) -> Vec<String> {
    vec![
        "@echo off".to_string(),
        format!("cd /d {}", batch_quote(&ctx.web_root.to_string_lossy())),
        action.to_string(),
        "if %errorlevel% equ 0 (".to_string(),
        "    echo SUCCESS".to_string(),
        ") else (".to_string(),
        "    echo FAILED".to_string(),
        ")".to_string(),
        "timeout /t 1 /nobreak >nul".to_string(),
        "del \"%~f0\"".to_string(),
        "exit".to_string(),
    ]
}

fn batch_elevation_preamble(title: &str) -> Vec<String> {
    vec![
        "@echo off".to_string(),
        "cls".to_string(),
        batch_echo(RULE),
        batch_echo(&format!("   {}", title)),
        batch_echo(RULE),
        batch_echo(""),
        String::new(),
        ":: Administrator privilege check".to_string(),
        "net session >nul 2>&1".to_string(),
        "if %errorLevel% neq 0 (".to_string(),
        "    echo [!] Requesting Administrator privileges...".to_string(),
        "    echo.".to_string(),
        "    powershell -Command \"Start-Process '%~f0' -Verb RunAs\"".to_string(),
        "    exit /b".to_string(),
        ")".to_string(),
        String::new(),
    ]
}

fn batch_epilogue() -> Vec<String> {
    vec![
        String::new(),
        batch_echo(""),
        batch_echo(RULE),
        "echo Press any key to close...".to_string(),
        "pause > nul".to_string(),
        String::new(),
        ":: Self-delete".to_string(),
        "del \"%~f0\"".to_string(),
        "exit".to_string(),
    ]
}

fn batch_interactive_create(ctx: &ScriptContext<'_>, name: &str, target: &Path) -> Vec<String> {
    let destination = ctx.destination.display();
    let mut lines = batch_elevation_preamble("SYMLINK CREATION PROCESS");
    lines.extend([
        batch_echo(&format!("Project: {}", name)),
        batch_echo(&format!("Target: {}", destination)),
        batch_echo(&format!("Source: {}", target.display())),
        batch_echo(""),
        "echo Creating symlink...".to_string(),
        batch_echo(""),
        String::new(),
        format!(
            "mklink /D {} {}",
            batch_quote(&destination.to_string()),
            batch_quote(&target.to_string_lossy())
        ),
        String::new(),
        "if %errorLevel% equ 0 (".to_string(),
        "    echo.".to_string(),
        "    echo [SUCCESS] Symlink created!".to_string(),
        "    echo.".to_string(),
        "    echo You can access your project at:".to_string(),
        format!("    {}", batch_echo(ctx.url)),
        ") else (".to_string(),
        "    echo.".to_string(),
        "    echo [ERROR] Could not create symlink!".to_string(),
        "    echo.".to_string(),
        "    echo Possible reasons:".to_string(),
        "    echo - Target folder already exists".to_string(),
        "    echo - Source folder not found".to_string(),
        ")".to_string(),
    ]);
    lines.extend(batch_epilogue());
    lines
}

fn batch_interactive_remove(ctx: &ScriptContext<'_>, name: &str) -> Vec<String> {
    let destination = ctx.destination.display();
    let dest = batch_quote(&destination.to_string());
    let mut lines = batch_elevation_preamble("SYMLINK REMOVAL PROCESS");
    lines.extend([
        batch_echo(&format!("Removing: {}", name)),
        batch_echo(&format!("Location: {}", destination)),
        batch_echo(""),
        String::new(),
        ":: Junctions and symlinks only lose the link, plain folders are deleted".to_string(),
        format!("fsutil reparsepoint query {} >nul 2>&1", dest),
        "if %errorLevel% equ 0 (".to_string(),
        "    echo [+] Symlink/Junction detected, removing...".to_string(),
        format!("    rmdir {} 2>&1", dest),
        ") else (".to_string(),
        "    echo [*] Removing folder...".to_string(),
        format!("    rmdir /S /Q {} 2>&1", dest),
        ")".to_string(),
        String::new(),
        format!("if not exist {} (", dest),
        "    echo.".to_string(),
        "    echo [SUCCESS] Symlink/Folder removed!".to_string(),
        ") else (".to_string(),
        "    echo.".to_string(),
        "    echo [ERROR] Could not remove!".to_string(),
        "    echo Possible reasons:".to_string(),
        "    echo - Folder is in use".to_string(),
        "    echo - Permission issue".to_string(),
        "    echo - File system error".to_string(),
        ")".to_string(),
    ]);
    lines.extend(batch_epilogue());
    lines
}

fn shell_quick_tail() -> Vec<String> {
    vec![
        "sleep 1".to_string(),
        "rm -f -- \"$0\"".to_string(),
        "exit $status".to_string(),
    ]
}

fn shell_quick_create(ctx: &ScriptContext<'_>, target: &Path) -> Vec<String> {
    let dest = sh_quote(&ctx.destination.to_string_lossy());
    let mut lines = vec![
        "#!/bin/sh".to_string(),
        format!("if [ ! -e {dest} ] && [ ! -L {dest} ] && ln -s {} {dest} >/dev/null 2>&1; then",
            sh_quote(&target.to_string_lossy())),
        "    echo SUCCESS".to_string(),
        "    status=0".to_string(),
        "else".to_string(),
        "    echo FAILED".to_string(),
        "    status=1".to_string(),
        "fi".to_string(),
    ];
    lines.extend(shell_quick_tail());
    lines
}

fn shell_quick_remove(ctx: &ScriptContext<'_>) -> Vec<String> {
    let dest = sh_quote(&ctx.destination.to_string_lossy());
    let mut lines = vec![
        "#!/bin/sh".to_string(),
        format!("if [ -L {dest} ]; then rm -f -- {dest}; else rmdir -- {dest}; fi >/dev/null 2>&1"),
        format!("if [ ! -e {dest} ] && [ ! -L {dest} ]; then"),
        "    echo SUCCESS".to_string(),
        "    status=0".to_string(),
        "else".to_string(),
        "    echo FAILED".to_string(),
        "    status=1".to_string(),
        "fi".to_string(),
    ];
    lines.extend(shell_quick_tail());
    lines
}

fn shell_elevation_preamble(title: &str) -> Vec<String> {
    vec![
        "#!/bin/sh".to_string(),
        "if [ \"$(id -u)\" -ne 0 ]; then".to_string(),
        "    echo '[!] Requesting administrator privileges...'".to_string(),
        "    exec sudo /bin/sh \"$0\" \"$@\"".to_string(),
        "fi".to_string(),
        String::new(),
        "clear 2>/dev/null".to_string(),
        sh_echo(RULE),
        sh_echo(&format!("   {}", title)),
        sh_echo(RULE),
        "echo".to_string(),
    ]
}

fn shell_epilogue() -> Vec<String> {
    vec![
        String::new(),
        "echo".to_string(),
        sh_echo(RULE),
        "printf 'Press Enter to close...'".to_string(),
        "read -r _".to_string(),
        String::new(),
        "rm -f -- \"$0\"".to_string(),
    ]
}

fn shell_interactive_create(ctx: &ScriptContext<'_>, name: &str, target: &Path) -> Vec<String> {
    let destination = ctx.destination.to_string_lossy();
    let target = target.to_string_lossy();
    let mut lines = shell_elevation_preamble("SYMLINK CREATION PROCESS");
    lines.extend([
        sh_echo(&format!("Project: {}", name)),
        sh_echo(&format!("Target: {}", destination)),
        sh_echo(&format!("Source: {}", target)),
        "echo".to_string(),
        "echo 'Creating symlink...'".to_string(),
        "echo".to_string(),
        String::new(),
        format!("if ln -s {} {}; then", sh_quote(&target), sh_quote(&destination)),
        "    echo".to_string(),
        "    echo '[SUCCESS] Symlink created!'".to_string(),
        "    echo".to_string(),
        "    echo 'You can access your project at:'".to_string(),
        format!("    {}", sh_echo(ctx.url)),
        "else".to_string(),
        "    echo".to_string(),
        "    echo '[ERROR] Could not create symlink!'".to_string(),
        "    echo".to_string(),
        "    echo 'Possible reasons:'".to_string(),
        "    echo '- Target folder already exists'".to_string(),
        "    echo '- Source folder not found'".to_string(),
        "fi".to_string(),
    ]);
    lines.extend(shell_epilogue());
    lines
}

fn shell_interactive_remove(ctx: &ScriptContext<'_>, name: &str) -> Vec<String> {
    let destination = ctx.destination.to_string_lossy();
    let dest = sh_quote(&destination);
    let mut lines = shell_elevation_preamble("SYMLINK REMOVAL PROCESS");
    lines.extend([
        sh_echo(&format!("Removing: {}", name)),
        sh_echo(&format!("Location: {}", destination)),
        "echo".to_string(),
        String::new(),
        format!("if [ -L {dest} ]; then"),
        "    echo '[+] Symlink detected, removing...'".to_string(),
        format!("    rm -f -- {dest}"),
        "else".to_string(),
        "    echo '[*] Removing folder...'".to_string(),
        format!("    rm -rf -- {dest}"),
        "fi".to_string(),
        String::new(),
        format!("if [ ! -e {dest} ] && [ ! -L {dest} ]; then"),
        "    echo".to_string(),
        "    echo '[SUCCESS] Symlink/Folder removed!'".to_string(),
        "else".to_string(),
        "    echo".to_string(),
        "    echo '[ERROR] Could not remove!'".to_string(),
        "    echo 'Possible reasons:'".to_string(),
        "    echo '- Folder is in use'".to_string(),
        "    echo '- Permission issue'".to_string(),
        "    echo '- File system error'".to_string(),
        "fi".to_string(),
    ]);
    lines.extend(shell_epilogue());
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::links::LinkName;
    use std::path::PathBuf;

    fn create_op() -> LinkOperation {
        LinkOperation::Create {
            name: LinkName::parse("projectA").unwrap(),
            target: PathBuf::from(r"C:\Users\dev\source\repos\projectA"),
        }
    }

    fn ctx<'a>(root: &'a Path, dest: &'a Path) -> ScriptContext<'a> {
        ScriptContext {
            web_root: root,
            destination: dest,
            url: "http://localhost/projectA",
        }
    }

    #[test]
    fn batch_quick_create_reports_status_and_deletes_itself() {
        let root = PathBuf::from(r"C:\xampp\htdocs");
        let dest = root.join("projectA");
        let text = render(ScriptFlavor::Batch, ScriptVariant::Quick, &create_op(), &ctx(&root, &dest));

        assert!(text.contains(r#"mklink /D "projectA" "C:\Users\dev\source\repos\projectA" >nul 2>&1"#));
        assert!(text.contains("echo SUCCESS"));
        assert!(text.contains("echo FAILED"));
        assert!(text.contains("del \"%~f0\""));
        assert!(text.contains("\r\n"));
        assert!(!text.contains("pause"));
    }

    #[test]
    fn batch_interactive_remove_requests_elevation_and_waits() {
        let root = PathBuf::from(r"C:\xampp\htdocs");
        let dest = root.join("projectA");
        let op = LinkOperation::Remove {
            name: LinkName::parse("projectA").unwrap(),
        };
        let text = render(ScriptFlavor::Batch, ScriptVariant::Interactive, &op, &ctx(&root, &dest));

        assert!(text.contains("net session >nul 2>&1"));
        assert!(text.contains("-Verb RunAs"));
        assert!(text.contains("fsutil reparsepoint query"));
        assert!(text.contains("pause > nul"));
        assert!(text.trim_end().ends_with("exit"));
    }

    #[test]
    fn shell_quick_create_guards_existing_destination() {
        let root = PathBuf::from("/var/www/html");
        let dest = root.join("projectA");
        let text = render(ScriptFlavor::Shell, ScriptVariant::Quick, &create_op(), &ctx(&root, &dest));

        assert!(text.starts_with("#!/bin/sh\n"));
        assert!(text.contains("[ ! -e '/var/www/html/projectA' ]"));
        assert!(text.contains("rm -f -- \"$0\""));
    }

    #[test]
    fn shell_interactive_create_reexecs_through_sudo() {
        let root = PathBuf::from("/var/www/html");
        let dest = root.join("projectA");
        let text = render(
            ScriptFlavor::Shell,
            ScriptVariant::Interactive,
            &create_op(),
            &ctx(&root, &dest),
        );

        assert!(text.contains("exec sudo /bin/sh \"$0\""));
        assert!(text.contains("http://localhost/projectA"));
        assert!(text.contains("read -r _"));
    }

    #[test]
    fn batch_interactive_create_escapes_operators_in_echoed_names() {
        let root = PathBuf::from(r"C:\xampp\htdocs");
        let dest = PathBuf::from(r"C:\xampp\htdocs\R&D");
        let op = LinkOperation::Create {
            name: LinkName::parse("R&D").unwrap(),
            target: PathBuf::from(r"C:\repos\R&D (100%)"),
        };
        let text = render(
            ScriptFlavor::Batch,
            ScriptVariant::Interactive,
            &op,
            &ScriptContext {
                web_root: &root,
                destination: &dest,
                url: "http://localhost/R&D",
            },
        );

        assert!(text.contains("echo Project: R^&D\r\n"));
        assert!(text.contains(r"echo Source: C:\repos\R^&D ^(100%%^)"));
        assert!(text.contains("    echo http://localhost/R^&D\r\n"));
        assert!(text.contains(r#"mklink /D "C:\xampp\htdocs\R&D" "C:\repos\R&D (100%%)""#));
        assert!(!text.contains("echo Project: R&D"));
    }

    #[test]
    fn sh_quote_escapes_single_quotes() {
        assert_eq!(sh_quote("it's"), r"'it'\''s'");
        assert_eq!(sh_quote("/plain"), "'/plain'");
    }
}
