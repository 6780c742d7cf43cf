//! Delivery of the digest by e-mail.
//!
//! [`notify`] checks that the account can both send (SMTP) and receive (POP)
//! before sending anything; a failed check abandons the digest for this run.
//! [`SmtpPopMailer`] is the production [`MailTransport`]: SMTP over implicit
//! TLS through `lettre`, and a POP3-over-TLS login probe for the inbound check.

use crate::api::MailTransport;
use crate::config::MailConfig;
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::error::Error;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig, RootCertStore, crypto::ring};
use tracing::{error, info, instrument, warn};

/// Send the digest `html` to `to` if the account passes both capability checks.
///
/// Returns whether the transport reported the message as sent.
#[instrument(level = "info", skip(transport, html), fields(bytes = html.len()))]
pub async fn notify<M: MailTransport>(transport: &M, to: &str, subject: &str, html: &str) -> bool {
    if transport.smtp_able().await {
        info!("SMTP is enabled");
    } else {
        warn!("SMTP is not enabled for the sender account; digest not sent");
        return false;
    }

    if transport.pop_able().await {
        info!("POP is enabled");
    } else {
        warn!("POP is not enabled for the sender account; digest not sent");
        return false;
    }

    match transport.send_html(to, subject, html).await {
        Ok(true) => {
            info!("Digest sent");
            true
        }
        Ok(false) => {
            warn!("Mail server did not accept the digest");
            false
        }
        Err(e) => {
            error!(error = %e, "Sending the digest failed");
            false
        }
    }
}

/// Mail account reached over SMTP (port 465 by default) and POP3 (995).
#[derive(Debug, Clone)]
pub struct SmtpPopMailer {
    mail: MailConfig,
}

impl SmtpPopMailer {
    pub fn new(mail: MailConfig) -> Self {
        Self { mail }
    }

    fn smtp_transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, Box<dyn Error>> {
        let host = self
            .mail
            .smtp_host()
            .ok_or("no SMTP host configured and the sender address has no domain")?;
        let credentials = Credentials::new(self.mail.sender.clone(), self.mail.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&host)?
            .port(self.mail.smtp_port)
            .credentials(credentials)
            .build();
        Ok(transport)
    }

    async fn pop_login(&self) -> Result<(), Box<dyn Error>> {
        let host = self
            .mail
            .pop_host()
            .ok_or("no POP host configured and the sender address has no domain")?;

        let roots = RootCertStore {
            roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
        };
        let tls = ClientConfig::builder_with_provider(Arc::new(ring::default_provider()))
            .with_safe_default_protocol_versions()?
            .with_root_certificates(roots)
            .with_no_client_auth();

        let tcp = TcpStream::connect((host.as_str(), self.mail.pop_port)).await?;
        let server_name = ServerName::try_from(host.clone())?;
        let stream = TlsConnector::from(Arc::new(tls))
            .connect(server_name, tcp)
            .await?;

        pop_session(stream, &self.mail.sender, &self.mail.password).await
    }
}

impl MailTransport for SmtpPopMailer {
    #[instrument(level = "info", skip_all)]
    async fn smtp_able(&self) -> bool {
        let transport = match self.smtp_transport() {
            Ok(transport) => transport,
            Err(e) => {
                warn!(error = %e, "Cannot build SMTP transport");
                return false;
            }
        };
        match transport.test_connection().await {
            Ok(connected) => connected,
            Err(e) => {
                warn!(error = %e, "SMTP check failed");
                false
            }
        }
    }

    #[instrument(level = "info", skip_all)]
    async fn pop_able(&self) -> bool {
        match self.pop_login().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "POP check failed");
                false
            }
        }
    }

    #[instrument(level = "info", skip(self, html))]
    async fn send_html(
        &self,
        to: &str,
        subject: &str,
        html: &str,
    ) -> Result<bool, Box<dyn Error>> {
        let message = Message::builder()
            .from(self.mail.sender.parse::<Mailbox>()?)
            .to(to.parse::<Mailbox>()?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html.to_string())?;

        let response = self.smtp_transport()?.send(message).await?;
        Ok(response.is_positive())
    }
}

/// Log into a POP3 server over an established stream and quit again.
async fn pop_session<S>(stream: S, user: &str, password: &str) -> Result<(), Box<dyn Error>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut stream = BufReader::new(stream);
    read_pop_reply(&mut stream).await?;
    pop_command(&mut stream, &format!("USER {user}")).await?;
    pop_command(&mut stream, &format!("PASS {password}")).await?;
    pop_command(&mut stream, "QUIT").await
}

async fn pop_command<S>(stream: &mut BufReader<S>, command: &str) -> Result<(), Box<dyn Error>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream.write_all(format!("{command}\r\n").as_bytes()).await?;
    stream.flush().await?;
    read_pop_reply(stream).await
}

async fn read_pop_reply<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<(), Box<dyn Error>> {
    let mut reply = String::new();
    reader.read_line(&mut reply).await?;
    if reply.starts_with("+OK") {
        Ok(())
    } else {
        Err(format!("POP server replied {:?}", reply.trim_end()).into())
    }
}
