use std::env;

use moltin_client::MoltinClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().pretty().init();

    let mut args = env::args().skip(1);
    let (Some(client_id), Some(client_secret), Some(product_id)) =
        (args.next(), args.next(), args.next())
    else {
        anyhow::bail!("usage: get_product <client-id> <client-secret> <product-id>");
    };
    let product_id = product_id.parse::<u64>()?;

    // Create a client, the initial authentication outcome comes with it
    let (client, authenticated) = MoltinClient::new(client_id, client_secret).await;
    authenticated?;

    let product = client.get_product(product_id).await?;
    let out = serde_json::to_string_pretty(&product)?;
    println!("{out}");

    Ok(())
}
