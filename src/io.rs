//! Input and output streams of an operation.
//!
//! Paths are opened the same way for every command: `-` refers to the
//! standard input or output of the process and an empty path is rejected.

use std::{
    fs::{File, OpenOptions},
    io::{self, BufWriter, Read, Write},
    path::Path,
};

use crate::error::{BoxError, ErrorKind, ErrorKindExt, JoinedError, JoseError};

/// Path which refers to the standard input or output stream.
pub const STD_STREAM: &str = "-";

#[derive(Debug)]
/// Readable stream opened by [`open_input`].
pub enum Input {
    Stdin(io::Stdin),
    File(File),
}

impl Read for Input {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Stdin(stdin) => stdin.read(buf),
            Self::File(file) => file.read(buf),
        }
    }
}

/// Open `path` for reading, `-` opens stdin.
pub fn open_input(path: &str) -> Result<Input, JoseError> {
    match path {
        "" => Err(ErrorKind::RequireFileName.into()),
        STD_STREAM => Ok(Input::Stdin(io::stdin())),
        path => File::open(path)
            .map(Input::File)
            .or_kind(ErrorKind::OpenFileFailed),
    }
}

/// Read all bytes of `path`, `-` reads stdin.
pub fn read_input(path: &str) -> Result<Vec<u8>, JoseError> {
    let mut input = open_input(path)?;
    let mut data = Vec::new();
    input
        .read_to_end(&mut data)
        .or_kind(ErrorKind::ReadFileFailed)?;
    tracing::trace!(path, len = data.len(), "read input");
    Ok(data)
}

/// Read a message which may also be given literally.
///
/// `arg` is read as a file if it is `-` or an existing path,
/// otherwise `arg` itself is the message.
pub fn read_message(arg: &str) -> Result<Vec<u8>, JoseError> {
    if arg == STD_STREAM || Path::new(arg).is_file() {
        read_input(arg)
    } else if arg.is_empty() {
        Err(ErrorKind::RequireFileName.into())
    } else {
        tracing::trace!("use argument as literal message");
        Ok(arg.as_bytes().to_vec())
    }
}

#[derive(Debug)]
/// Writable stream opened by [`open_output`].
///
/// Use [`Output::close`] to find out if all data was written.
pub struct Output {
    inner: OutputInner,
}

#[derive(Debug)]
enum OutputInner {
    Stdout(io::Stdout),
    File(BufWriter<File>),
}

impl Output {
    /// Flush and close this stream.
    pub fn close(self) -> Result<(), JoseError> {
        match self.inner {
            OutputInner::Stdout(mut stdout) => stdout.flush().or_kind(ErrorKind::CloseFailed),
            OutputInner::File(writer) => {
                let file = writer
                    .into_inner()
                    .map_err(io::IntoInnerError::into_error)
                    .or_kind(ErrorKind::CloseFailed)?;
                file.sync_all().or_kind(ErrorKind::CloseFailed)
            }
        }
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.inner {
            OutputInner::Stdout(stdout) => stdout.write(buf),
            OutputInner::File(file) => file.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.inner {
            OutputInner::Stdout(stdout) => stdout.flush(),
            OutputInner::File(file) => file.flush(),
        }
    }
}

/// Open `path` for writing, `-` opens stdout.
///
/// Files are created if needed and truncated otherwise.
/// New files are only accessible by their owner.
pub fn open_output(path: &str) -> Result<Output, JoseError> {
    let inner = match path {
        "" => return Err(ErrorKind::RequireFileName.into()),
        STD_STREAM => OutputInner::Stdout(io::stdout()),
        path => {
            let mut options = OpenOptions::new();
            options.write(true).create(true).truncate(true);
            #[cfg(unix)]
            {
                use std::os::unix::fs::OpenOptionsExt as _;
                options.mode(0o600);
            }
            let file = options.open(path).or_kind(ErrorKind::CreateFileFailed)?;
            OutputInner::File(BufWriter::new(file))
        }
    };
    Ok(Output { inner })
}

/// Open `path`, hand the stream to `write` and close it again.
///
/// The stream is closed whatever `write` returns. An error
/// raised while closing is joined onto the error of `write`.
pub fn with_output<F>(path: &str, write: F) -> Result<(), BoxError>
where
    F: FnOnce(&mut Output) -> Result<(), JoseError>,
{
    let mut output = open_output(path)?;
    let result = write(&mut output);
    let closed = output.close();
    match (result, closed) {
        (Ok(()), Ok(())) => Ok(()),
        (Err(err), Ok(())) => Err(err.into()),
        (Ok(()), Err(err)) => Err(err.into()),
        (Err(err), Err(close_err)) => Err(JoinedError::join(err, vec![close_err.into()])),
    }
}

#[cfg(test)]
mod tests {
    use tokio_test::{assert_err, assert_ok};

    use super::*;
    use crate::error::error_kinds;

    #[test]
    fn empty_path_requires_file_name() {
        let err = assert_err!(open_input(""));
        assert_eq!(err.kind(), ErrorKind::RequireFileName);
        let err = assert_err!(open_output(""));
        assert_eq!(err.kind(), ErrorKind::RequireFileName);
    }

    #[test]
    fn missing_input_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let err = assert_err!(read_input(path.to_str().unwrap()));
        assert_eq!(err.kind(), ErrorKind::OpenFileFailed);
    }

    #[test]
    fn output_is_written_and_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let path = path.to_str().unwrap();

        let write = |data: &'static [u8]| {
            move |w: &mut Output| w.write_all(data).or_kind(ErrorKind::WriteOutputFailed)
        };
        assert_ok!(with_output(path, write(b"a longer first line\n".as_slice())));
        assert_ok!(with_output(path, write(b"short\n".as_slice())));

        assert_eq!(assert_ok!(read_input(path)), b"short\n");
    }

    #[cfg(unix)]
    #[test]
    fn created_files_are_private() {
        use std::os::unix::fs::PermissionsExt as _;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secret.json");
        assert_ok!(with_output(path.to_str().unwrap(), |_| Ok(())));
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn writer_error_is_returned_after_close() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let err = assert_err!(with_output(path.to_str().unwrap(), |_| {
            Err(ErrorKind::WriteJsonFailed.into())
        }));
        assert_eq!(error_kinds(&*err), vec![ErrorKind::WriteJsonFailed]);
        assert!(path.exists());
    }

    #[test]
    fn create_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("out.txt");
        let err = assert_err!(open_output(path.to_str().unwrap()));
        assert_eq!(err.kind(), ErrorKind::CreateFileFailed);
    }

    #[test]
    fn message_can_be_given_literally() {
        assert_eq!(assert_ok!(read_message("a.b.c")), b"a.b.c");

        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"x.y.z").unwrap();
        assert_eq!(
            assert_ok!(read_message(file.path().to_str().unwrap())),
            b"x.y.z"
        );
        assert_eq!(
            assert_err!(read_message("")).kind(),
            ErrorKind::RequireFileName
        );
    }
}
