//! Gradle Kotlin DSL loader
//!
//! Reads the subset of `build.gradle.kts` used by Flutter application
//! modules into a [`BuildDescriptor`]. The file is split into block and
//! statement tokens first (comments dropped, string literals kept whole),
//! then statements are interpreted according to the enclosing block path,
//! e.g. `android > defaultConfig`. Statements outside the recognised
//! blocks are skipped.

use crate::descriptor::{BuildDescriptor, BuildType, CompileOptions, Dependency, SdkVersions, Setting};
use crate::error::{DescriptorError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static NAMED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(?:getByName|create|named|maybeCreate|register)\(\s*"([^"]+)"\s*\)$"#)
        .expect("valid regex")
});

static ASSIGNMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z_][\w.]*)\s*=\s*([^=].*)$").expect("valid regex"));

static CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z_][\w.]*)\s*\((.*)\)(.*)$").expect("valid regex"));

static STRING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^"((?:[^"\\]|\\.)*)"$"#).expect("valid regex"));

static JAVA_VERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^JavaVersion\.VERSION_(?:1_)?(\d+)(?:\.toString\(\))?$").expect("valid regex")
});

static SIGNING_CONFIG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^signingConfigs(?:\.getByName\(\s*"([^"]+)"\s*\)|\[\s*"([^"]+)"\s*\]|\.([A-Za-z_]\w*))$"#,
    )
    .expect("valid regex")
});

static REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_]\w*(?:\.[A-Za-z_]\w*)+$").expect("valid regex"));

/// Load a descriptor from a `build.gradle.kts` file
pub fn load_descriptor(path: &Path) -> Result<BuildDescriptor> {
    tracing::debug!(path = %path.display(), "Loading build descriptor");
    let source = std::fs::read_to_string(path)?;
    parse_descriptor(&source)
}

/// Parse `build.gradle.kts` source text
pub fn parse_descriptor(source: &str) -> Result<BuildDescriptor> {
    let mut builder = DescriptorBuilder::default();
    for token in Lexer::new(source).tokenize()? {
        match token {
            Token::Open { header, line } => builder.open(&header, line)?,
            Token::Close => {
                builder.path.pop();
            }
            Token::Statement { text, line } => builder.statement(&text, line)?,
        }
    }
    builder.finish()
}

fn parse_error(line: usize, message: impl Into<String>) -> DescriptorError {
    DescriptorError::Parse {
        line,
        message: message.into(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    /// `header {`
    Open { header: String, line: usize },
    Close,
    Statement { text: String, line: usize },
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    buffer: String,
    buffer_line: usize,
    parens: usize,
    open_blocks: Vec<usize>,
    tokens: Vec<Token>,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            buffer: String::new(),
            buffer_line: 1,
            parens: 0,
            open_blocks: Vec::new(),
            tokens: Vec::new(),
        }
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn tokenize(mut self) -> Result<Vec<Token>> {
        while let Some(c) = self.peek(0) {
            self.pos += 1;
            match c {
                '"' => self.string()?,
                '/' if self.peek(0) == Some('/') => {
                    while self.peek(0).is_some_and(|c| c != '\n') {
                        self.pos += 1;
                    }
                }
                '/' if self.peek(0) == Some('*') => self.block_comment()?,
                '(' => {
                    self.parens += 1;
                    self.push(c);
                }
                ')' => {
                    if self.parens == 0 {
                        return Err(parse_error(self.line, "unexpected ')'"));
                    }
                    self.parens -= 1;
                    self.push(c);
                }
                // Lambdas passed as call arguments stay inside the statement.
                '{' | '}' if self.parens > 0 => self.push(c),
                '{' => {
                    let line = if self.buffer.is_empty() { self.line } else { self.buffer_line };
                    let header = std::mem::take(&mut self.buffer).trim().to_string();
                    self.tokens.push(Token::Open { header, line });
                    self.open_blocks.push(self.line);
                }
                '}' => {
                    self.flush();
                    if self.open_blocks.pop().is_none() {
                        return Err(parse_error(self.line, "unexpected '}'"));
                    }
                    self.tokens.push(Token::Close);
                }
                '\n' => {
                    // An assignment may continue on the next line.
                    if self.parens > 0 || self.buffer.trim_end().ends_with('=') {
                        self.push(' ');
                    } else {
                        self.flush();
                    }
                    self.line += 1;
                }
                ';' if self.parens == 0 => self.flush(),
                _ => self.push(c),
            }
        }

        if self.parens > 0 {
            return Err(parse_error(self.line, "unbalanced parentheses at end of file"));
        }
        if let Some(&line) = self.open_blocks.last() {
            return Err(parse_error(line, "block is never closed"));
        }
        self.flush();
        Ok(self.tokens)
    }

    fn push(&mut self, c: char) {
        if c.is_whitespace() && (self.buffer.is_empty() || self.buffer.ends_with(' ')) {
            return;
        }
        if self.buffer.is_empty() {
            self.buffer_line = self.line;
        }
        self.buffer.push(if c.is_whitespace() { ' ' } else { c });
    }

    fn flush(&mut self) {
        let text = self.buffer.trim();
        if !text.is_empty() {
            self.tokens.push(Token::Statement {
                text: text.to_string(),
                line: self.buffer_line,
            });
        }
        self.buffer.clear();
    }

    /// Copy a string literal whose opening quote was just consumed
    fn string(&mut self) -> Result<()> {
        let start = self.line;
        self.push('"');

        if self.peek(0) == Some('"') && self.peek(1) == Some('"') {
            self.pos += 2;
            self.buffer.push_str("\"\"");
            let content_start = self.buffer.len();
            while let Some(c) = self.peek(0) {
                self.pos += 1;
                if c == '\n' {
                    self.line += 1;
                }
                self.buffer.push(c);
                if self.buffer.len() >= content_start + 3 && self.buffer.ends_with("\"\"\"") {
                    return Ok(());
                }
            }
            return Err(parse_error(start, "unterminated raw string"));
        }

        while let Some(c) = self.peek(0) {
            self.pos += 1;
            match c {
                '\\' => {
                    self.buffer.push(c);
                    if let Some(escaped) = self.peek(0) {
                        self.pos += 1;
                        self.buffer.push(escaped);
                    }
                }
                '"' => {
                    self.buffer.push(c);
                    return Ok(());
                }
                '\n' => break,
                _ => self.buffer.push(c),
            }
        }
        Err(parse_error(start, "unterminated string literal"))
    }

    fn block_comment(&mut self) -> Result<()> {
        let start = self.line;
        self.pos += 1;
        while let Some(c) = self.peek(0) {
            self.pos += 1;
            match c {
                '\n' => self.line += 1,
                '*' if self.peek(0) == Some('/') => {
                    self.pos += 1;
                    // A comment between two words still separates them.
                    if !self.buffer.is_empty() {
                        self.buffer.push(' ');
                    }
                    return Ok(());
                }
                _ => {}
            }
        }
        Err(parse_error(start, "unterminated block comment"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Expr {
    Str(String),
    Int(i64),
    Bool(bool),
    JavaVersion(u32),
    SigningConfig(String),
    Reference(String),
    Other(String),
}

impl Expr {
    fn parse(text: &str) -> Self {
        let text = text.trim();
        if let Some(caps) = STRING.captures(text) {
            return Expr::Str(unescape(&caps[1]));
        }
        if let Ok(n) = text.parse::<i64>() {
            return Expr::Int(n);
        }
        match text {
            "true" => return Expr::Bool(true),
            "false" => return Expr::Bool(false),
            _ => {}
        }
        if let Some(level) = JAVA_VERSION
            .captures(text)
            .and_then(|caps| caps[1].parse().ok())
        {
            return Expr::JavaVersion(level);
        }
        if let Some(caps) = SIGNING_CONFIG.captures(text) {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .or_else(|| caps.get(3))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            return Expr::SigningConfig(name);
        }
        if REFERENCE.is_match(text) {
            return Expr::Reference(text.to_string());
        }
        Expr::Other(text.to_string())
    }
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// `key = value`, or `key(value)` for the method-style setters
fn setting(text: &str) -> Option<(String, Expr)> {
    if let Some(caps) = ASSIGNMENT.captures(text) {
        return Some((caps[1].to_string(), Expr::parse(&caps[2])));
    }
    let caps = CALL.captures(text)?;
    if !caps[3].trim().is_empty() || caps[2].trim().is_empty() {
        return None;
    }
    Some((caps[1].to_string(), Expr::parse(&caps[2])))
}

fn block_name(header: &str) -> String {
    NAMED_BLOCK
        .captures(header)
        .map(|caps| caps[1].to_string())
        .unwrap_or_else(|| header.to_string())
}

fn skipped(text: &str, line: usize) {
    tracing::debug!(line, statement = text, "Skipping unrecognised statement");
}

#[derive(Default)]
struct DescriptorBuilder {
    path: Vec<String>,
    plugins: Vec<String>,
    namespace: Option<String>,
    application_id: Option<String>,
    compile_sdk: Option<Setting<u32>>,
    min_sdk: Option<Setting<u32>>,
    target_sdk: Option<Setting<u32>>,
    ndk_version: Option<Setting<String>>,
    version_code: Option<Setting<i64>>,
    version_name: Option<Setting<String>>,
    compile_options: CompileOptions,
    jvm_toolchain: Option<u32>,
    jvm_target: Option<u32>,
    build_types: Vec<BuildType>,
    signing_configs: Vec<String>,
    flutter_source: Option<String>,
    dependencies: Vec<Dependency>,
}

impl DescriptorBuilder {
    fn open(&mut self, header: &str, line: usize) -> Result<()> {
        // `implementation("g:n:v") { exclude(...) }`
        if self.path == ["dependencies"] {
            self.dependency(header, line)?;
        }

        self.path.push(block_name(header));
        match self.path.as_slice() {
            [android, build_types, name] if android == "android" && build_types == "buildTypes" => {
                if !self.build_types.iter().any(|bt| &bt.name == name) {
                    self.build_types.push(BuildType::new(name.clone()));
                }
            }
            [android, signing_configs, name]
                if android == "android" && signing_configs == "signingConfigs" =>
            {
                if !self.signing_configs.contains(name) {
                    self.signing_configs.push(name.clone());
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn statement(&mut self, text: &str, line: usize) -> Result<()> {
        let path = self.path.clone();
        let path: Vec<&str> = path.iter().map(String::as_str).collect();
        match path.as_slice() {
            ["plugins"] => self.plugin(text, line),
            ["dependencies"] => self.dependency(text, line),
            ["kotlin"] | ["android", "kotlin"] => self.kotlin(text, line),
            ["android", rest @ ..] => self.android(rest, text, line),
            ["flutter"] => {
                match setting(text) {
                    Some((key, expr)) if key == "source" => {
                        self.flutter_source = Some(string(&key, expr, line)?);
                    }
                    _ => skipped(text, line),
                }
                Ok(())
            }
            _ => {
                skipped(text, line);
                Ok(())
            }
        }
    }

    fn plugin(&mut self, text: &str, line: usize) -> Result<()> {
        if let Some(id) = text
            .strip_prefix('`')
            .and_then(|rest| rest.strip_suffix('`'))
        {
            self.plugins.push(id.to_string());
            return Ok(());
        }
        let Some(caps) = CALL.captures(text) else {
            skipped(text, line);
            return Ok(());
        };
        match (&caps[1], Expr::parse(&caps[2])) {
            ("id", Expr::Str(id)) => self.plugins.push(id),
            ("kotlin", Expr::Str(module)) => {
                self.plugins.push(format!("org.jetbrains.kotlin.{}", module));
            }
            ("id" | "kotlin", _) => {
                return Err(parse_error(line, format!("expected a plugin id string in `{}`", text)));
            }
            _ => skipped(text, line),
        }
        Ok(())
    }

    fn dependency(&mut self, text: &str, line: usize) -> Result<()> {
        let Some(caps) = CALL.captures(text) else {
            skipped(text, line);
            return Ok(());
        };
        let configuration = &caps[1];
        match Expr::parse(&caps[2]) {
            Expr::Str(notation) => {
                let dependency = Dependency::parse(configuration, &notation).ok_or_else(|| {
                    parse_error(
                        line,
                        format!("malformed dependency notation \"{}\"", notation),
                    )
                })?;
                self.dependencies.push(dependency);
            }
            // platform(...), project(...), files(...), version catalog aliases
            _ => skipped(text, line),
        }
        Ok(())
    }

    fn kotlin(&mut self, text: &str, line: usize) -> Result<()> {
        match setting(text) {
            Some((key, expr)) if key == "jvmToolchain" => {
                self.jvm_toolchain = Some(java_level(&key, expr, line)?);
            }
            _ => skipped(text, line),
        }
        Ok(())
    }

    fn android(&mut self, block: &[&str], text: &str, line: usize) -> Result<()> {
        let Some((key, expr)) = setting(text) else {
            skipped(text, line);
            return Ok(());
        };

        match (block, key.as_str()) {
            ([], "namespace") => self.namespace = Some(string(&key, expr, line)?),
            ([], "compileSdk" | "compileSdkVersion") => {
                self.compile_sdk = Some(level(&key, expr, line)?);
            }
            ([], "ndkVersion") => self.ndk_version = Some(text_setting(&key, expr, line)?),

            (["compileOptions"], "sourceCompatibility") => {
                self.compile_options.source_compatibility = Some(java_level(&key, expr, line)?);
            }
            (["compileOptions"], "targetCompatibility") => {
                self.compile_options.target_compatibility = Some(java_level(&key, expr, line)?);
            }
            (["compileOptions"], "isCoreLibraryDesugaringEnabled" | "coreLibraryDesugaringEnabled") => {
                self.compile_options.core_library_desugaring = boolean(&key, expr, line)?;
            }

            (["kotlinOptions"], "jvmTarget") => {
                self.jvm_target = Some(java_level(&key, expr, line)?);
            }

            (["defaultConfig"], "applicationId") => {
                self.application_id = Some(string(&key, expr, line)?);
            }
            (["defaultConfig"], "minSdk" | "minSdkVersion") => {
                self.min_sdk = Some(level(&key, expr, line)?);
            }
            (["defaultConfig"], "targetSdk" | "targetSdkVersion") => {
                self.target_sdk = Some(level(&key, expr, line)?);
            }
            (["defaultConfig"], "versionCode") => {
                self.version_code = Some(match expr {
                    Expr::Int(n) => Setting::Value(n),
                    Expr::Reference(r) => Setting::Reference(r),
                    other => return Err(unexpected(&key, "an integer", &other, line)),
                });
            }
            (["defaultConfig"], "versionName") => {
                self.version_name = Some(text_setting(&key, expr, line)?);
            }

            (["buildTypes", name], "signingConfig") => {
                let signing_config = match expr {
                    Expr::SigningConfig(config) => config,
                    other => return Err(unexpected(&key, "a signingConfigs entry", &other, line)),
                };
                if let Some(build_type) = self.build_types.iter_mut().find(|bt| bt.name == *name) {
                    build_type.signing_config = Some(signing_config);
                }
            }
            (["buildTypes", name], "isMinifyEnabled" | "minifyEnabled") => {
                let enabled = boolean(&key, expr, line)?;
                if let Some(build_type) = self.build_types.iter_mut().find(|bt| bt.name == *name) {
                    build_type.minify_enabled = Some(enabled);
                }
            }

            // Credentials are never read.
            (["signingConfigs", _], _) => {}

            _ => skipped(text, line),
        }
        Ok(())
    }

    fn finish(self) -> Result<BuildDescriptor> {
        Ok(BuildDescriptor {
            plugins: self.plugins,
            namespace: self.namespace,
            application_id: self.application_id.unwrap_or_default(),
            sdk: SdkVersions {
                compile: self
                    .compile_sdk
                    .ok_or(DescriptorError::MissingField("android.compileSdk"))?,
                min: self
                    .min_sdk
                    .ok_or(DescriptorError::MissingField("defaultConfig.minSdk"))?,
                target: self
                    .target_sdk
                    .ok_or(DescriptorError::MissingField("defaultConfig.targetSdk"))?,
            },
            ndk_version: self.ndk_version,
            version_code: self
                .version_code
                .ok_or(DescriptorError::MissingField("defaultConfig.versionCode"))?,
            version_name: self.version_name,
            compile_options: self.compile_options,
            jvm_toolchain: self.jvm_toolchain,
            jvm_target: self.jvm_target,
            build_types: self.build_types,
            signing_configs: self.signing_configs,
            flutter_source: self.flutter_source,
            dependencies: self.dependencies,
        })
    }
}

fn unexpected(key: &str, expected: &str, found: &Expr, line: usize) -> DescriptorError {
    let found = match found {
        Expr::Str(s) => format!("\"{}\"", s),
        Expr::Int(n) => n.to_string(),
        Expr::Bool(b) => b.to_string(),
        Expr::JavaVersion(v) => format!("JavaVersion {}", v),
        Expr::SigningConfig(name) => format!("signingConfigs[\"{}\"]", name),
        Expr::Reference(r) | Expr::Other(r) => r.clone(),
    };
    parse_error(line, format!("expected {} for {}, found {}", expected, key, found))
}

fn string(key: &str, expr: Expr, line: usize) -> Result<String> {
    match expr {
        Expr::Str(s) => Ok(s),
        other => Err(unexpected(key, "a string", &other, line)),
    }
}

fn boolean(key: &str, expr: Expr, line: usize) -> Result<bool> {
    match expr {
        Expr::Bool(b) => Ok(b),
        other => Err(unexpected(key, "true or false", &other, line)),
    }
}

fn level(key: &str, expr: Expr, line: usize) -> Result<Setting<u32>> {
    match expr {
        Expr::Int(n) => u32::try_from(n)
            .map(Setting::Value)
            .map_err(|_| unexpected(key, "an API level", &Expr::Int(n), line)),
        Expr::Reference(r) => Ok(Setting::Reference(r)),
        other => Err(unexpected(key, "an API level", &other, line)),
    }
}

fn text_setting(key: &str, expr: Expr, line: usize) -> Result<Setting<String>> {
    match expr {
        Expr::Str(s) => Ok(Setting::Value(s)),
        Expr::Reference(r) => Ok(Setting::Reference(r)),
        other => Err(unexpected(key, "a string", &other, line)),
    }
}

/// `JavaVersion.VERSION_17`, `17`, `"17"` or `"1.8"`
fn java_level(key: &str, expr: Expr, line: usize) -> Result<u32> {
    let parsed = match &expr {
        Expr::JavaVersion(v) => Some(*v),
        Expr::Int(n) => u32::try_from(*n).ok(),
        Expr::Str(s) => s
            .strip_prefix("1.")
            .unwrap_or(s)
            .parse()
            .ok(),
        _ => None,
    };
    parsed.ok_or_else(|| unexpected(key, "a Java language level", &expr, line))
}
