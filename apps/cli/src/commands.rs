use std::io::{self, BufRead, Write};

use clap::Args;
use donasi_client::DonasiApiClient;
use donasi_core::{
    donations::{
        confirmation_summary, format_rupiah, is_payment_return, DonationField, DonationForm,
        FormState, PaymentOutcome, PaymentStep, ProgramSummary,
    },
    status::{PaymentStatus, PaymentStatusPoller, PaymentStatusView},
};

use crate::main_lib::AppContext;

#[derive(Args, Debug, Clone, Default)]
pub struct DonateArgs {
    /// Donor name
    #[arg(long, conflicts_with = "default_name")]
    pub name: Option<String>,
    /// Donate as "Hamba Allah"
    #[arg(long, default_value_t = false)]
    pub default_name: bool,
    #[arg(long, default_value = "")]
    pub address: String,
    /// WhatsApp number, digits only
    #[arg(long, default_value = "")]
    pub phone: String,
    #[arg(long, default_value = "")]
    pub email: String,
    /// Amount in rupiah
    #[arg(long, default_value = "")]
    pub amount: String,
    #[arg(long, default_value = "")]
    pub message: String,
    /// Donate to a specific program
    #[arg(long)]
    pub program: Option<String>,
    /// Skip the confirmation prompts
    #[arg(long, default_value_t = false)]
    pub yes: bool,
}

/// Fill a form from command line arguments.
pub fn fill_form(
    args: &DonateArgs,
    program: Option<ProgramSummary>,
) -> anyhow::Result<DonationForm> {
    let mut form = DonationForm::new(None, args.program.clone());
    if let Some(program) = program {
        form = form.with_program(program);
    }

    if args.default_name {
        form.set_use_default_name(true)?;
    } else if let Some(name) = &args.name {
        form.set_field(DonationField::Name, name.as_str())?;
    }
    form.set_field(DonationField::Address, args.address.as_str())?;
    form.set_field(DonationField::PhoneNumber, args.phone.as_str())?;
    form.set_field(DonationField::Email, args.email.as_str())?;
    form.set_field(DonationField::Amount, args.amount.as_str())?;
    form.set_field(DonationField::Message, args.message.as_str())?;
    Ok(form)
}

fn ask(question: &str) -> anyhow::Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "ya" | "yes"
    ))
}

async fn load_program(
    client: &DonasiApiClient,
    program_id: Option<&str>,
) -> Option<ProgramSummary> {
    let program_id = program_id?;
    match client.get_program(program_id).await {
        Ok(program) => Some(program),
        Err(e) => {
            tracing::warn!("Could not load program {}: {}", program_id, e);
            None
        }
    }
}

pub async fn donate(ctx: &AppContext, args: DonateArgs) -> anyhow::Result<()> {
    let program = load_program(&ctx.client, args.program.as_deref()).await;
    let mut form = fill_form(&args, program)?;

    if form.request_confirmation().is_err() {
        eprintln!("Periksa kembali data donasi:");
        for (field, message) in form.field_errors().iter() {
            eprintln!("  {}: {}", field.as_str(), message);
        }
        anyhow::bail!("donation form has {} invalid field(s)", form.field_errors().len());
    }

    if let FormState::Confirming { donation } = form.state() {
        println!("Konfirmasi donasi:");
        for (label, value) in confirmation_summary(donation, form.program()) {
            println!("  {:<13} {}", label, value);
        }
    }
    if !args.yes && !ask("Kirim donasi ini?")? {
        form.cancel_confirmation()?;
        println!("Donasi dibatalkan.");
        return Ok(());
    }

    let submitted = match form
        .submit(ctx.client.as_ref(), &ctx.slot, &ctx.config.origin)
        .await
    {
        Ok(submitted) => submitted,
        Err(e) => {
            if let Some(message) = form.submission_error() {
                eprintln!("{}", message);
            }
            return Err(e.into());
        }
    };
    tracing::info!("Donation {} recorded", submitted.donation_id);

    match submitted.outcome {
        PaymentOutcome::ThankYou => {
            println!("Terima kasih! Donasi Anda telah kami terima.");
        }
        PaymentOutcome::AwaitingPayment { .. } => {
            if let PaymentStep::Instructions(lines) = form.proceed_to_payment()? {
                println!("Petunjuk pembayaran:");
                for (i, line) in lines.iter().enumerate() {
                    println!("  {}. {}", i + 1, line);
                }
            }
            if !args.yes && !ask("Lanjut ke halaman pembayaran?")? {
                println!("Jalankan `donasi status` untuk memeriksa pembayaran nanti.");
                return Ok(());
            }
            if let PaymentStep::Redirect(url) = form.proceed_to_payment()? {
                println!("Buka halaman pembayaran: {}", url);
            }
        }
    }
    Ok(())
}

fn print_status(view: &PaymentStatusView) {
    println!("Status: {}", view.status.label());
    if let Some(id) = &view.donation_id {
        println!("  Donasi   {}", id);
    }
    if let Some(amount) = view.amount {
        println!("  Nominal  {}", format_rupiah(amount));
    }
    if let Some(title) = &view.program_title {
        println!("  Program  {}", title);
    }
    if let Some(error) = &view.error {
        println!("  {}", error);
    }
    for action in view.actions() {
        println!("  -> {} ({})", action.label(), action.route());
    }
}

pub async fn status(
    ctx: &AppContext,
    once: bool,
    return_url: Option<&str>,
) -> anyhow::Result<()> {
    if let Some(url) = return_url {
        if !is_payment_return(url) {
            anyhow::bail!("'{}' is not a payment return link", url);
        }
        tracing::info!("Back from the payment page");
    }

    let poller = PaymentStatusPoller::new(ctx.client.clone(), ctx.slot.clone());
    if once {
        print_status(&poller.resolve_once().await);
        return Ok(());
    }

    let interval = poller.interval();
    let mut watch = poller.start();
    loop {
        tokio::select! {
            view = watch.changed() => match view {
                Some(view) => {
                    print_status(&view);
                    if view.status != PaymentStatus::Pending {
                        break;
                    }
                    println!("Memeriksa ulang dalam {} detik...", interval.as_secs());
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Stopped watching payment status");
                break;
            }
        }
    }
    watch.stop();
    Ok(())
}

fn print_program(program: &ProgramSummary) {
    println!("[{}] {}", program.id, program.title);
    if let Some(description) = &program.description {
        println!("  {}", description);
    }
    match (program.collected_amount, program.target_amount) {
        (Some(collected), Some(target)) => println!(
            "  Terkumpul {} dari {}",
            format_rupiah(collected),
            format_rupiah(target)
        ),
        (Some(collected), None) => println!("  Terkumpul {}", format_rupiah(collected)),
        (None, Some(target)) => println!("  Target {}", format_rupiah(target)),
        (None, None) => {}
    }
}

pub async fn program(ctx: &AppContext, program_id: &str) -> anyhow::Result<()> {
    let program = ctx.client.get_program(program_id).await?;
    print_program(&program);
    Ok(())
}

pub async fn programs(ctx: &AppContext) -> anyhow::Result<()> {
    let programs = ctx.client.list_programs().await?;
    if programs.is_empty() {
        println!("Belum ada program donasi.");
    }
    for program in &programs {
        print_program(program);
    }
    Ok(())
}

/// Forget the tracked donation and the stored session.
pub fn reset(ctx: &AppContext) -> anyhow::Result<()> {
    ctx.slot.clear()?;
    ctx.session.teardown()?;
    println!("Data lokal dihapus.");
    Ok(())
}
